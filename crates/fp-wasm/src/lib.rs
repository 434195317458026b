//! WASM bridge for FP: exposes the layout and catalog stores to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Elements, projects, and
//! templates cross the boundary as JSON strings in the wire format of
//! `fp-core`; ids and selector values cross as plain strings.

mod storage;

pub use storage::LocalStorage;

use fp_core::catalog::{TemplateDraft, instantiate_template};
use fp_core::id::ElementId;
use fp_core::index::path_to;
use fp_core::lint::lint_project;
use fp_core::model::{Cell, Element, Project, PropMap, ViewMode, WallSide};
use fp_editor::{CatalogStore, KeyValueStore, LayoutStore, MemoryStore};
use wasm_bindgen::prelude::*;

/// The planner handle held by the web UI.
///
/// Every call that changes the tree returns whether it applied; refused
/// operations leave the project and undo history untouched.
#[wasm_bindgen]
pub struct FpPlanner {
    layout: LayoutStore,
    catalog: CatalogStore,
}

#[wasm_bindgen]
impl FpPlanner {
    /// Open the planner on `localStorage`, falling back to an in-memory
    /// session when storage is unavailable.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        install_console_hooks();
        match (LocalStorage::open(), LocalStorage::open()) {
            (Ok(layout), Ok(catalog)) => Self::with_stores(Box::new(layout), Box::new(catalog)),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("{e}; changes will not be remembered");
                Self::in_memory()
            }
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn project_json(&self) -> String {
        to_json(self.layout.project(), "{}")
    }

    /// The element being viewed, as JSON, or `"null"`.
    pub fn current_element_json(&self) -> String {
        to_json(&self.layout.current_element(), "null")
    }

    pub fn element_json(&self, id: &str) -> String {
        to_json(&self.layout.find(ElementId::intern(id)), "null")
    }

    /// Ids from the top-level element down to `id`, as a JSON array.
    pub fn breadcrumb_json(&self, id: &str) -> String {
        let path = path_to(ElementId::intern(id), &self.layout.project().elements);
        let ids: Vec<&str> = path.iter().flatten().map(ElementId::as_str).collect();
        to_json(&ids, "[]")
    }

    /// `[{ "id", "nombre" }]` for every floor.
    pub fn floors_json(&self) -> String {
        let floors: Vec<serde_json::Value> = self
            .layout
            .floors()
            .into_iter()
            .map(|f| serde_json::json!({ "id": f.id, "nombre": f.name() }))
            .collect();
        to_json(&floors, "[]")
    }

    /// Selected element id, or an empty string.
    pub fn selected_id(&self) -> String {
        self.layout
            .selected_id()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn can_undo(&self) -> bool {
        self.layout.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.layout.can_redo()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: &str) -> bool {
        self.layout.select_element(ElementId::intern(id))
    }

    pub fn clear_selection(&mut self) {
        self.layout.clear_selection();
    }

    // ─── Tree edits ──────────────────────────────────────────────────────

    /// Append an element given as JSON under `parent_id`.
    pub fn add_element(&mut self, parent_id: &str, element_json: &str) -> bool {
        let element: Element = match serde_json::from_str(element_json) {
            Ok(el) => el,
            Err(e) => {
                log::warn!("add_element: bad element JSON: {e}");
                return false;
            }
        };
        self.layout.add_element(ElementId::intern(parent_id), element)
    }

    /// Instantiate the catalog template `key` under `parent_id`.
    /// Returns the new element id, or an empty string.
    pub fn add_from_template(&mut self, parent_id: &str, key: &str) -> String {
        let Some(template) = self.catalog.template(key) else {
            log::warn!("add_from_template: unknown template `{key}`");
            return String::new();
        };
        let element = instantiate_template(template);
        let id = element.id;
        if self.layout.add_element(ElementId::intern(parent_id), element) {
            id.as_str().to_string()
        } else {
            String::new()
        }
    }

    pub fn remove_element(&mut self, id: &str) -> bool {
        self.layout.remove_element(ElementId::intern(id))
    }

    /// Merge JSON object patches into `props` / `custom`. An empty string
    /// leaves that map alone.
    pub fn update_element(&mut self, id: &str, props_json: &str, custom_json: &str) -> bool {
        let (Some(props), Some(custom)) = (parse_patch(props_json), parse_patch(custom_json))
        else {
            return false;
        };
        self.layout
            .update_element(ElementId::intern(id), props.as_ref(), custom.as_ref())
    }

    pub fn cut(&mut self, id: &str) -> bool {
        self.layout.cut_to_buffer(ElementId::intern(id))
    }

    /// Paste the buffered element into `target_id`. A zero `row` or
    /// `column` pastes without grid placement.
    pub fn paste(&mut self, target_id: &str, row: u32, column: u32) -> bool {
        let cell = (row > 0 && column > 0).then(|| Cell::new(row, column));
        self.layout
            .paste_buffer_into(ElementId::intern(target_id), cell)
    }

    pub fn has_buffer(&self) -> bool {
        self.layout.buffer().is_some()
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn set_view(&mut self, id: &str) -> bool {
        self.layout.set_view(ElementId::intern(id))
    }

    pub fn go_back(&mut self) -> bool {
        self.layout.go_back()
    }

    /// `"xy"`, `"zx"`, or `"zy"`; anything else is ignored.
    pub fn set_view_mode(&mut self, mode: &str) -> bool {
        match ViewMode::parse(mode) {
            Some(mode) => self.layout.set_view_mode(mode),
            None => {
                log::debug!("set_view_mode: unknown mode `{mode}`");
                false
            }
        }
    }

    /// `"norte"`, `"sur"`, `"este"`, or `"oeste"`; anything else is ignored.
    pub fn set_wall(&mut self, side: &str) -> bool {
        match WallSide::parse(side) {
            Some(side) => self.layout.set_wall_facing(side),
            None => {
                log::debug!("set_wall: unknown side `{side}`");
                false
            }
        }
    }

    // ─── Floors ──────────────────────────────────────────────────────────

    /// Returns the new floor id, or an empty string.
    pub fn create_floor(&mut self, name: &str) -> String {
        self.layout
            .create_floor(name)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn rename_floor(&mut self, id: &str, name: &str) -> bool {
        self.layout.rename_floor(ElementId::intern(id), name)
    }

    pub fn delete_floor(&mut self, id: &str) -> bool {
        self.layout.delete_floor(ElementId::intern(id))
    }

    pub fn select_floor(&mut self, id: &str) -> bool {
        self.layout.select_floor(ElementId::intern(id))
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.layout.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.layout.redo()
    }

    // ─── Import / export ─────────────────────────────────────────────────

    /// Replace the project. Throws a JS `Error` describing the rejection.
    pub fn import_json(&mut self, text: &str) -> Result<(), JsValue> {
        self.try_import(text)
            .map_err(|msg| js_sys::Error::new(&msg).into())
    }

    pub fn export_json(&self) -> String {
        to_json(&self.layout.export_project(), "{}")
    }

    // ─── Catalog ─────────────────────────────────────────────────────────

    pub fn templates_json(&self) -> String {
        to_json(self.catalog.list_templates(), "[]")
    }

    /// Define a template from form input. Returns the stored template as
    /// JSON, or an empty string when `draft_json` is not an object.
    pub fn define_template(&mut self, draft_json: &str) -> String {
        match serde_json::from_str::<TemplateDraft>(draft_json) {
            Ok(draft) => to_json(&self.catalog.define_custom_template(&draft), ""),
            Err(e) => {
                log::warn!("define_template: bad draft JSON: {e}");
                String::new()
            }
        }
    }
}

impl FpPlanner {
    pub fn with_stores(layout: Box<dyn KeyValueStore>, catalog: Box<dyn KeyValueStore>) -> Self {
        Self {
            layout: LayoutStore::new(layout),
            catalog: CatalogStore::new(catalog),
        }
    }

    pub fn in_memory() -> Self {
        Self::with_stores(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    pub fn layout(&self) -> &LayoutStore {
        &self.layout
    }

    fn try_import(&mut self, text: &str) -> Result<(), String> {
        self.layout.import_json(text).map_err(|e| e.to_string())
    }
}

impl Default for FpPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Lint a project given as JSON. Returns a JSON array of
/// `{ "id", "rule", "severity", "message" }`; a payload that is not a
/// project yields a single `parse` entry.
#[wasm_bindgen]
pub fn validate(project_json: &str) -> String {
    let project: Project = match serde_json::from_str(project_json) {
        Ok(p) => p,
        Err(e) => {
            let diag = serde_json::json!([{
                "id": null,
                "rule": "parse",
                "severity": "error",
                "message": e.to_string(),
            }]);
            return diag.to_string();
        }
    };
    let diags: Vec<serde_json::Value> = lint_project(&project)
        .into_iter()
        .map(|d| {
            serde_json::json!({
                "id": d.element_id,
                "rule": d.rule,
                "severity": format!("{:?}", d.severity).to_lowercase(),
                "message": d.message,
            })
        })
        .collect();
    to_json(&diags, "[]")
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn to_json<T: serde::Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serializing for JS failed: {e}");
        fallback.to_string()
    })
}

/// `Some(None)` for an empty patch, `Some(Some(map))` for an object,
/// `None` when the text is not a JSON object.
fn parse_patch(text: &str) -> Option<Option<PropMap>> {
    if text.trim().is_empty() {
        return Some(None);
    }
    match serde_json::from_str::<PropMap>(text) {
        Ok(map) => Some(Some(map)),
        Err(e) => {
            log::warn!("update_element: patch is not a JSON object: {e}");
            None
        }
    }
}

fn install_console_hooks() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOKS: Once = Once::new();
        SET_HOOKS.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("FP WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if log::set_logger(&console_log::LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Info);
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
mod console_log {
    use log::{Level, Metadata, Record};
    use wasm_bindgen::JsValue;

    pub static LOGGER: ConsoleLogger = ConsoleLogger;

    pub struct ConsoleLogger;

    impl log::Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let msg: JsValue = format!("[{}] {}", record.target(), record.args()).into();
            match record.level() {
                Level::Error => web_sys::console::error_1(&msg),
                Level::Warn => web_sys::console::warn_1(&msg),
                _ => web_sys::console::log_1(&msg),
            }
        }

        fn flush(&self) {}
    }
}
