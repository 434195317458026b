//! Layout store: the mutation API over the live project.
//!
//! Every mutating operation runs as a transaction: preconditions are checked
//! against the live state, a copy of the state is taken, the mutation is
//! applied, and only then is the copy pushed as an undo checkpoint and the
//! new project persisted. When a precondition fails the operation is a
//! silent no-op: nothing changes, no checkpoint is taken, and the method
//! returns `false` (or `None`).
//!
//! The checkpointed state is [`EditorState`]: the project plus the move
//! buffer, so undoing a cut puts the element back and empties the buffer.
//! Selection is UI state and lives outside the checkpoints.

use crate::history::{DEFAULT_HISTORY_LIMIT, History};
use crate::persist::{self, KeyValueStore, MemoryStore};
use fp_core::id::ElementId;
use fp_core::index::{find_element, find_element_mut, find_parent, find_parent_mut, walk};
use fp_core::lint::{LintSeverity, lint_project};
use fp_core::model::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

// ─── Config ──────────────────────────────────────────────────────────────

/// Configuration for [`LayoutStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Undo checkpoints kept before the oldest is evicted. Default: **100**.
    pub history_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

// ─── State ───────────────────────────────────────────────────────────────

/// Everything a checkpoint captures.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub project: Project,
    /// Element cut out of the tree and not yet pasted.
    pub buffer: Option<Element>,
}

/// Why an import payload was rejected.
#[derive(Debug)]
pub enum ImportError {
    /// The text is not JSON at all.
    Json(serde_json::Error),
    /// `elementos` is missing or not an array.
    MissingElements,
    /// `vistaActual` is missing or not a string.
    MissingCurrentView,
    /// Right shape, but a field does not fit the project model.
    Malformed(serde_json::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Json(e) => write!(f, "not valid JSON: {e}"),
            ImportError::MissingElements => f.write_str("`elementos` must be an array"),
            ImportError::MissingCurrentView => f.write_str("`vistaActual` must be a string"),
            ImportError::Malformed(e) => write!(f, "malformed project: {e}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Json(e) | ImportError::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

/// Owns the live project, move buffer, selection, and undo history.
pub struct LayoutStore {
    state: EditorState,
    selected: Option<ElementId>,
    history: History<EditorState>,
    storage: Box<dyn KeyValueStore>,
}

impl LayoutStore {
    /// Open a store on `storage`, hydrating the project from it when a
    /// valid one is stored, otherwise starting from the default project.
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self::with_config(storage, StoreConfig::default())
    }

    pub fn with_config(storage: Box<dyn KeyValueStore>, config: StoreConfig) -> Self {
        let project = persist::load_project(storage.as_ref()).unwrap_or_default();
        Self::from_parts(project, storage, config)
    }

    /// A store over an existing project, without reading `storage`.
    pub fn with_project(
        project: Project,
        storage: Box<dyn KeyValueStore>,
        config: StoreConfig,
    ) -> Self {
        Self::from_parts(project, storage, config)
    }

    /// A default project backed by a throwaway in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    fn from_parts(project: Project, storage: Box<dyn KeyValueStore>, config: StoreConfig) -> Self {
        Self {
            state: EditorState {
                project,
                buffer: None,
            },
            selected: None,
            history: History::new(config.history_limit),
            storage,
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn project(&self) -> &Project {
        &self.state.project
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn buffer(&self) -> Option<&Element> {
        self.state.buffer.as_ref()
    }

    pub fn history(&self) -> &History<EditorState> {
        &self.history
    }

    pub fn find(&self, id: ElementId) -> Option<&Element> {
        find_element(id, &self.state.project.elements)
    }

    pub fn parent_of(&self, id: ElementId) -> Option<&Element> {
        find_parent(id, &self.state.project.elements)
    }

    pub fn root(&self) -> Option<&Element> {
        self.state.project.root()
    }

    /// The element being viewed; falls back to the root when the stored
    /// view id does not resolve.
    pub fn current_element(&self) -> Option<&Element> {
        self.find(self.state.project.current_view)
            .or_else(|| self.root())
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.find(id))
    }

    /// Floors of the project: the root itself when it is a floor,
    /// otherwise the root's floor children.
    pub fn floors(&self) -> Vec<&Element> {
        match self.root() {
            Some(root) if root.is_floor() => vec![root],
            Some(root) => root.children.iter().filter(|c| c.is_floor()).collect(),
            None => Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Selection (not checkpointed) ────────────────────────────────────

    /// Select an existing element. Unknown ids are ignored.
    pub fn select_element(&mut self, id: ElementId) -> bool {
        if self.find(id).is_none() {
            log::debug!("select_element: `{id}` not found");
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Clear a selection whose element is no longer in the tree.
    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selected
            && self.find(id).is_none()
        {
            self.selected = None;
        }
    }

    // ─── Tree edits ──────────────────────────────────────────────────────

    /// Append `element` to the children of `parent_id`. Refused when any id
    /// in `element`'s subtree is already used by the project or the buffer.
    pub fn add_element(&mut self, parent_id: ElementId, element: Element) -> bool {
        if let Some(taken) = self.first_taken_id(&element) {
            log::debug!("add_element: id `{taken}` is already in use");
            return false;
        }
        self.transact("add_element", |s| {
            let parent = find_element_mut(parent_id, &mut s.project.elements)?;
            parent.children.push(element);
            Some(())
        })
        .is_some()
    }

    /// Remove the element `id` (and its subtree) from its parent.
    /// The root cannot be removed.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let removed = self
            .transact("remove_element", |s| detach(s, id))
            .is_some();
        if removed {
            self.drop_stale_selection();
        }
        removed
    }

    /// Shallow-merge the given patches into `props` / `custom` of `id`.
    pub fn update_element(
        &mut self,
        id: ElementId,
        props: Option<&PropMap>,
        custom: Option<&PropMap>,
    ) -> bool {
        self.transact("update_element", |s| {
            let el = find_element_mut(id, &mut s.project.elements)?;
            if let Some(patch) = props {
                el.merge_props(patch);
            }
            if let Some(patch) = custom {
                el.merge_custom(patch);
            }
            Some(())
        })
        .is_some()
    }

    // ─── Move buffer ─────────────────────────────────────────────────────

    /// Detach `id` from its parent into the move buffer. An element already
    /// in the buffer is replaced (last cut wins).
    pub fn cut_to_buffer(&mut self, id: ElementId) -> bool {
        let cut = self
            .transact("cut_to_buffer", |s| {
                let el = detach(s, id)?;
                if let Some(dropped) = s.buffer.replace(el) {
                    log::debug!("cut_to_buffer: `{}` replaced in buffer", dropped.id);
                }
                Some(())
            })
            .is_some();
        if cut {
            self.drop_stale_selection();
        }
        cut
    }

    /// Append the buffered element to `target_id`, emptying the buffer.
    ///
    /// With a `cell` and a target that declares a grid, the element is moved
    /// to the cell origin and its footprint is shrunk (never grown) to fit
    /// the cell.
    pub fn paste_buffer_into(&mut self, target_id: ElementId, cell: Option<Cell>) -> bool {
        if self.state.buffer.is_none() || self.find(target_id).is_none() {
            log::debug!("paste_buffer_into: empty buffer or unknown target `{target_id}`");
            return false;
        }
        self.transact("paste_buffer_into", |s| {
            let target = find_element_mut(target_id, &mut s.project.elements)?;
            let mut el = s.buffer.take()?;
            if let (Some(cell), Some(grid)) = (cell, target.grid()) {
                let bounds = grid.cell_bounds(
                    target.prop_f64(KEY_WIDTH).unwrap_or(0.0),
                    target.prop_f64(KEY_DEPTH).unwrap_or(0.0),
                    cell,
                );
                fit_into_cell(&mut el, bounds);
            }
            target.children.push(el);
            Some(())
        })
        .is_some()
    }

    // ─── View navigation ─────────────────────────────────────────────────

    /// Switch the current view to `id`, remembering the previous one.
    pub fn set_view(&mut self, id: ElementId) -> bool {
        let changed = self
            .transact("set_view", |s| {
                if !s.project.contains(id) {
                    return None;
                }
                let previous = s.project.current_view;
                s.project.view_history.push(previous);
                s.project.current_view = id;
                Some(())
            })
            .is_some();
        if changed {
            self.selected = None;
        }
        changed
    }

    /// Return to the previously visited view. A remembered view that no
    /// longer exists falls back to the root.
    pub fn go_back(&mut self) -> bool {
        let changed = self
            .transact("go_back", |s| {
                let previous = s.project.view_history.pop()?;
                s.project.current_view = if s.project.contains(previous) {
                    previous
                } else {
                    ElementId::root()
                };
                Some(())
            })
            .is_some();
        if changed {
            self.selected = None;
        }
        changed
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        self.transact("set_view_mode", |s| {
            s.project.view_mode = mode;
            Some(())
        })
        .is_some()
    }

    pub fn set_wall_facing(&mut self, side: WallSide) -> bool {
        self.transact("set_wall_facing", |s| {
            s.project.wall = side;
            Some(())
        })
        .is_some()
    }

    // ─── Floors & building ───────────────────────────────────────────────

    /// Turn a floor root into a building whose single floor holds the old
    /// root content. Returns the new floor's id.
    pub fn promote_root_to_building(&mut self) -> Option<ElementId> {
        self.transact("promote_root_to_building", |s| promote_root(&mut s.project))
    }

    /// Append a new default floor to the building, promoting a floor root
    /// first. Promotion and creation share one undo checkpoint. An empty
    /// `name` names the floor after its id.
    pub fn create_floor(&mut self, name: &str) -> Option<ElementId> {
        self.transact("create_floor", |s| {
            let root_is_floor = s.project.root()?.is_floor();
            if root_is_floor {
                promote_root(&mut s.project)?;
            }
            let id = ElementId::generate("planta");
            let name = if name.is_empty() { id.as_str() } else { name };
            let floor = Element::floor(id, Some(name));
            s.project.root_mut()?.children.push(floor);
            Some(id)
        })
    }

    pub fn rename_floor(&mut self, id: ElementId, name: &str) -> bool {
        self.transact("rename_floor", |s| {
            let floor = find_element_mut(id, &mut s.project.elements).filter(|e| e.is_floor())?;
            floor.set_name(name);
            Some(())
        })
        .is_some()
    }

    /// Delete an empty floor. Floors with children are refused. A view on
    /// the deleted floor moves to its parent.
    pub fn delete_floor(&mut self, id: ElementId) -> bool {
        let eligible = self
            .find(id)
            .is_some_and(|f| f.is_floor() && f.children.is_empty());
        if !eligible {
            log::debug!("delete_floor: `{id}` is not an empty floor");
            return false;
        }
        let deleted = self
            .transact("delete_floor", |s| detach(s, id))
            .is_some();
        if deleted {
            self.drop_stale_selection();
        }
        deleted
    }

    /// [`set_view`](Self::set_view) restricted to floors.
    pub fn select_floor(&mut self, id: ElementId) -> bool {
        if !self.find(id).is_some_and(Element::is_floor) {
            log::debug!("select_floor: `{id}` is not a floor");
            return false;
        }
        self.set_view(id)
    }

    // ─── Undo / Redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.state) {
            return false;
        }
        self.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.state) {
            return false;
        }
        self.after_restore();
        true
    }

    fn after_restore(&mut self) {
        self.drop_stale_selection();
        self.persist();
    }

    // ─── Import / Export ─────────────────────────────────────────────────

    /// Replace the whole project with `json`. The payload must carry an
    /// `elementos` array and a string `vistaActual`; anything else is
    /// rejected without touching the current project or history.
    pub fn import_project(&mut self, json: &Value) -> Result<(), ImportError> {
        if !json.get("elementos").is_some_and(Value::is_array) {
            return Err(ImportError::MissingElements);
        }
        if !json.get("vistaActual").is_some_and(Value::is_string) {
            return Err(ImportError::MissingCurrentView);
        }
        let project = Project::deserialize(json).map_err(ImportError::Malformed)?;

        for diag in lint_project(&project) {
            match diag.severity {
                LintSeverity::Warning => log::warn!("import: [{}] {}", diag.rule, diag.message),
                LintSeverity::Info => log::info!("import: [{}] {}", diag.rule, diag.message),
            }
        }

        self.transact("import_project", move |s| {
            s.project = project;
            Some(())
        });
        self.selected = None;
        log::info!("imported project `{}`", self.state.project.name);
        Ok(())
    }

    /// [`import_project`](Self::import_project) from JSON text.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        let value: Value = serde_json::from_str(text).map_err(ImportError::Json)?;
        self.import_project(&value)
    }

    /// An independent deep copy of the current project.
    pub fn export_project(&self) -> Project {
        self.state.project.clone()
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Run `mutate` as one undoable step. `mutate` must return `None` before
    /// it changes anything; a `Some` commits the checkpoint and persists.
    fn transact<T>(
        &mut self,
        op: &str,
        mutate: impl FnOnce(&mut EditorState) -> Option<T>,
    ) -> Option<T> {
        let checkpoint = self.state.clone();
        match mutate(&mut self.state) {
            Some(out) => {
                self.history.record(checkpoint);
                self.persist();
                log::debug!("{op}: applied");
                Some(out)
            }
            None => {
                log::debug!("{op}: precondition failed, nothing changed");
                None
            }
        }
    }

    /// First id of `element`'s subtree that is already taken, either by the
    /// project, the buffer, or an earlier node of the same subtree.
    fn first_taken_id(&self, element: &Element) -> Option<ElementId> {
        let mut in_use = HashSet::new();
        walk(&self.state.project.elements, &mut |el, _| {
            in_use.insert(el.id);
        });
        if let Some(buffered) = &self.state.buffer {
            walk(std::slice::from_ref(buffered), &mut |el, _| {
                in_use.insert(el.id);
            });
        }
        let mut taken = None;
        walk(std::slice::from_ref(element), &mut |el, _| {
            if taken.is_none() && !in_use.insert(el.id) {
                taken = Some(el.id);
            }
        });
        taken
    }

    /// Save the project, logging and dropping any storage failure.
    fn persist(&mut self) {
        if let Err(e) = persist::save_project(self.storage.as_mut(), &self.state.project) {
            log::warn!("saving project failed, continuing in memory: {e}");
        }
    }
}

/// Take `id` out of its parent's children. A current view inside the
/// detached subtree moves to that parent.
fn detach(state: &mut EditorState, id: ElementId) -> Option<Element> {
    let parent = find_parent_mut(id, &mut state.project.elements)?;
    let pos = parent.child_position(id)?;
    let parent_id = parent.id;
    let el = parent.children.remove(pos);
    if !state.project.contains(state.project.current_view) {
        state.project.current_view = parent_id;
    }
    Some(el)
}

/// Move `el` to the cell origin and shrink its footprint to the cell.
fn fit_into_cell(el: &mut Element, cell: CellBounds) {
    el.set_prop(KEY_X, cell.x);
    el.set_prop(KEY_Y, cell.y);
    if el.prop_f64(KEY_WIDTH).is_some_and(|w| w > cell.width) {
        el.set_prop(KEY_WIDTH, cell.width);
    }
    if el.prop_f64(KEY_DEPTH).is_some_and(|d| d > cell.depth) {
        el.set_prop(KEY_DEPTH, cell.depth);
    }
}

/// Wrap a floor root's content into a new floor under a building root.
/// Returns `None` without changes unless the root is a floor.
fn promote_root(project: &mut Project) -> Option<ElementId> {
    let root = project.root_mut().filter(|r| r.is_floor())?;
    let floor_id = ElementId::generate("planta");

    let mut floor = Element::new(floor_id, ElementKind::Floor);
    floor.props = root.props.clone();
    floor.custom = root.custom.clone();
    floor.set_name("Planta 1");
    floor.children = std::mem::take(&mut root.children);

    root.kind = ElementKind::Building;
    if root.name().is_none() {
        root.set_name("Edificio");
    }
    root.children = vec![floor];

    if project.current_view.is_root() {
        project.current_view = floor_id;
    }
    log::info!("promoted root to building; content moved to `{floor_id}`");
    Some(floor_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(id: &str) -> Element {
        let mut el = Element::new(ElementId::intern(id), ElementKind::Object("barril".into()));
        el.set_prop(KEY_WIDTH, 60);
        el.set_prop(KEY_DEPTH, 60);
        el
    }

    fn store_with(children: Vec<Element>) -> LayoutStore {
        let mut project = Project::default();
        project.root_mut().unwrap().children = children;
        LayoutStore::with_project(project, Box::new(MemoryStore::new()), StoreConfig::default())
    }

    #[test]
    fn add_to_unknown_parent_is_noop() {
        let mut store = store_with(vec![]);
        assert!(!store.add_element(ElementId::intern("st_nowhere"), obj("st_a")));
        assert!(!store.can_undo());
        assert!(store.find(ElementId::intern("st_a")).is_none());
    }

    #[test]
    fn remove_root_is_noop() {
        let mut store = store_with(vec![obj("st_b")]);
        assert!(!store.remove_element(ElementId::root()));
        assert!(!store.remove_element(ElementId::intern("st_unknown")));
        assert!(!store.can_undo());
    }

    #[test]
    fn remove_clears_matching_selection() {
        let mut store = store_with(vec![obj("st_c"), obj("st_d")]);
        assert!(store.select_element(ElementId::intern("st_c")));
        assert!(store.remove_element(ElementId::intern("st_d")));
        assert_eq!(store.selected_id(), Some(ElementId::intern("st_c")));
        assert!(store.remove_element(ElementId::intern("st_c")));
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn removing_ancestor_clears_nested_selection() {
        let mut parent = obj("st_anc");
        parent.children.push(obj("st_leaf"));
        let mut store = store_with(vec![parent]);
        assert!(store.select_element(ElementId::intern("st_leaf")));
        assert!(store.remove_element(ElementId::intern("st_anc")));
        assert_eq!(store.selected_id(), None);
        assert!(store.selected_element().is_none());
    }

    #[test]
    fn cutting_ancestor_clears_nested_selection() {
        let mut parent = obj("st_cut_anc");
        parent.children.push(obj("st_cut_leaf"));
        let mut store = store_with(vec![parent]);
        store.select_element(ElementId::intern("st_cut_leaf"));
        assert!(store.cut_to_buffer(ElementId::intern("st_cut_anc")));
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn add_refuses_taken_ids() {
        let mut store = store_with(vec![obj("st_dup")]);
        assert!(!store.add_element(ElementId::root(), obj("st_dup")));
        assert!(!store.add_element(ElementId::root(), obj("root")));

        let mut nested = obj("st_fresh");
        nested.children.push(obj("st_dup"));
        assert!(!store.add_element(ElementId::root(), nested));

        let mut twice = obj("st_twin");
        twice.children.push(obj("st_twin"));
        assert!(!store.add_element(ElementId::root(), twice));

        assert!(!store.can_undo());
        assert_eq!(store.root().unwrap().children.len(), 1);
        assert!(lint_project(store.project()).is_empty());
    }

    #[test]
    fn add_refuses_id_held_in_buffer() {
        let mut store = store_with(vec![obj("st_held")]);
        store.cut_to_buffer(ElementId::intern("st_held"));
        assert!(!store.add_element(ElementId::root(), obj("st_held")));
        assert!(store.paste_buffer_into(ElementId::root(), None));
        assert!(lint_project(store.project()).is_empty());
    }

    #[test]
    fn update_merges_shallowly() {
        let mut store = store_with(vec![obj("st_e")]);
        let props = json!({ "x": 10 });
        let custom = json!({ "color": "#ff0000" });
        assert!(store.update_element(
            ElementId::intern("st_e"),
            props.as_object(),
            custom.as_object()
        ));
        let el = store.find(ElementId::intern("st_e")).unwrap();
        assert_eq!(el.prop_f64(KEY_X), Some(10.0));
        assert_eq!(el.prop_f64(KEY_WIDTH), Some(60.0));
        assert_eq!(el.custom["color"], json!("#ff0000"));
    }

    #[test]
    fn paste_without_grid_keeps_position() {
        let mut store = store_with(vec![obj("st_f"), obj("st_g")]);
        assert!(store.cut_to_buffer(ElementId::intern("st_f")));
        assert!(store.paste_buffer_into(ElementId::intern("st_g"), Some(Cell::new(2, 2))));
        let f = store.find(ElementId::intern("st_f")).unwrap();
        assert_eq!(f.prop_f64(KEY_X), None);
        assert_eq!(store.parent_of(f.id).unwrap().id, ElementId::intern("st_g"));
    }

    #[test]
    fn paste_into_unknown_target_keeps_buffer() {
        let mut store = store_with(vec![obj("st_h")]);
        store.cut_to_buffer(ElementId::intern("st_h"));
        let undo_before = store.history().undo_len();
        assert!(!store.paste_buffer_into(ElementId::intern("st_none"), None));
        assert_eq!(store.buffer().map(|e| e.id), Some(ElementId::intern("st_h")));
        assert_eq!(store.history().undo_len(), undo_before);
    }

    #[test]
    fn last_cut_wins() {
        let mut store = store_with(vec![obj("st_i"), obj("st_j")]);
        store.cut_to_buffer(ElementId::intern("st_i"));
        store.cut_to_buffer(ElementId::intern("st_j"));
        assert_eq!(store.buffer().map(|e| e.id), Some(ElementId::intern("st_j")));
        assert!(store.find(ElementId::intern("st_i")).is_none());
    }

    #[test]
    fn undo_of_cut_restores_element_and_empties_buffer() {
        let mut store = store_with(vec![obj("st_k")]);
        store.cut_to_buffer(ElementId::intern("st_k"));
        assert!(store.undo());
        assert!(store.buffer().is_none());
        assert!(store.find(ElementId::intern("st_k")).is_some());
        assert!(store.redo());
        assert_eq!(store.buffer().map(|e| e.id), Some(ElementId::intern("st_k")));
    }

    #[test]
    fn set_view_rejects_unknown_id() {
        let mut store = store_with(vec![]);
        assert!(!store.set_view(ElementId::intern("st_ghost")));
        assert_eq!(store.project().current_view, ElementId::root());
    }

    #[test]
    fn go_back_with_empty_history_is_noop() {
        let mut store = store_with(vec![]);
        assert!(!store.go_back());
        assert!(!store.can_undo());
    }

    #[test]
    fn view_navigation_roundtrip() {
        let mut store = store_with(vec![obj("st_l")]);
        store.select_element(ElementId::intern("st_l"));
        assert!(store.set_view(ElementId::intern("st_l")));
        assert_eq!(store.selected_id(), None);
        assert_eq!(store.project().view_history, vec![ElementId::root()]);
        assert_eq!(store.current_element().unwrap().id, ElementId::intern("st_l"));

        assert!(store.go_back());
        assert_eq!(store.project().current_view, ElementId::root());
        assert!(store.project().view_history.is_empty());
    }

    #[test]
    fn go_back_to_removed_view_falls_back_to_root() {
        let mut store = store_with(vec![obj("st_m"), obj("st_n")]);
        store.set_view(ElementId::intern("st_m"));
        store.set_view(ElementId::intern("st_n"));
        store.remove_element(ElementId::intern("st_m"));
        assert!(store.go_back());
        assert_eq!(store.project().current_view, ElementId::root());
    }

    #[test]
    fn view_mode_and_wall() {
        let mut store = store_with(vec![]);
        assert!(store.set_view_mode(ViewMode::Zy));
        assert!(store.set_wall_facing(WallSide::South));
        assert_eq!(store.project().view_mode, ViewMode::Zy);
        assert_eq!(store.project().wall, WallSide::South);
    }

    #[test]
    fn floors_of_floor_root_and_building() {
        let mut store = store_with(vec![obj("st_o")]);
        assert_eq!(store.floors().len(), 1);
        assert!(store.floors()[0].id.is_root());

        store.create_floor("Planta 2");
        let names: Vec<Option<&str>> = store.floors().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec![Some("Planta 1"), Some("Planta 2")]);
    }

    #[test]
    fn create_floor_is_one_undo_step() {
        let mut store = store_with(vec![obj("st_p")]);
        let before = store.export_project();
        store.create_floor("Nueva").unwrap();
        assert_eq!(store.history().undo_len(), 1);
        store.undo();
        assert_eq!(store.export_project(), before);
    }

    #[test]
    fn create_floor_with_blank_name_uses_id() {
        let mut store = store_with(vec![]);
        let id = store.create_floor("").unwrap();
        assert_eq!(store.find(id).unwrap().name(), Some(id.as_str()));
    }

    #[test]
    fn promote_twice_is_noop() {
        let mut store = store_with(vec![]);
        assert!(store.promote_root_to_building().is_some());
        assert!(store.promote_root_to_building().is_none());
        assert_eq!(store.history().undo_len(), 1);
        assert_eq!(store.root().unwrap().name(), Some("Edificio"));
    }

    #[test]
    fn rename_only_touches_floors() {
        let mut store = store_with(vec![obj("st_q")]);
        assert!(!store.rename_floor(ElementId::intern("st_q"), "X"));
        assert!(store.rename_floor(ElementId::root(), "Planta baja"));
        assert_eq!(store.root().unwrap().name(), Some("Planta baja"));
    }

    #[test]
    fn delete_floor_moves_view_to_parent() {
        let mut store = store_with(vec![]);
        let id = store.create_floor("Temporal").unwrap();
        assert!(store.select_floor(id));
        assert!(store.delete_floor(id));
        assert!(store.find(id).is_none());
        assert_eq!(store.project().current_view, ElementId::root());
    }

    #[test]
    fn select_floor_rejects_objects() {
        let mut store = store_with(vec![obj("st_r")]);
        assert!(!store.select_floor(ElementId::intern("st_r")));
        assert!(!store.can_undo());
    }

    #[test]
    fn import_rejects_wrong_shape() {
        let mut store = store_with(vec![obj("st_s")]);
        let before = store.export_project();
        assert!(matches!(
            store.import_project(&json!({ "foo": 1 })),
            Err(ImportError::MissingElements)
        ));
        assert!(matches!(
            store.import_project(&json!({ "elementos": [], "vistaActual": 3 })),
            Err(ImportError::MissingCurrentView)
        ));
        assert!(matches!(
            store.import_project(&json!({ "elementos": [{ "id": 1 }], "vistaActual": "root" })),
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(store.import_json("{"), Err(ImportError::Json(_))));
        assert_eq!(store.export_project(), before);
        assert!(!store.can_undo());
    }

    #[test]
    fn import_replaces_and_is_undoable() {
        let mut store = store_with(vec![obj("st_t")]);
        let before = store.export_project();
        let payload = json!({
            "nombre": "Otra",
            "vistaActual": "root",
            "elementos": [{ "id": "root", "tipo": "planta", "props": {}, "custom": {}, "hijos": [] }]
        });
        store.import_project(&payload).unwrap();
        assert_eq!(store.project().name, "Otra");
        assert_eq!(store.project().scale, 0.25);
        assert!(store.find(ElementId::intern("st_t")).is_none());

        store.undo();
        assert_eq!(store.export_project(), before);
    }

    #[test]
    fn export_is_independent() {
        let mut store = store_with(vec![obj("st_u")]);
        let mut exported = store.export_project();
        exported.root_mut().unwrap().children.clear();
        assert!(store.find(ElementId::intern("st_u")).is_some());
    }
}
