//! `fp`: inspect saved floor-plan projects and catalogs.
//!
//! ```text
//! fp tree <project.json>     indented outline of the element tree
//! fp lint <project.json>     diagnostics; exits 1 when any is a warning
//! fp catalog [dir]           templates stored in <dir>, or the built-ins
//! ```
//!
//! Set `RUST_LOG=debug` for store-level logging.

use fp_core::id::ElementId;
use fp_core::index::walk;
use fp_core::lint::{LintSeverity, lint_project};
use fp_core::model::{Element, Project};
use fp_editor::{CatalogStore, FileStore};
use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "usage: fp <tree|lint> <project.json> | fp catalog [dir]";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["tree", file] => read_project(Path::new(file)).map(|p| {
            print!("{}", outline(&p));
            ExitCode::SUCCESS
        }),
        ["lint", file] => read_project(Path::new(file)).map(|p| {
            if lint(&p) > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }),
        ["catalog"] => Ok(catalog(CatalogStore::in_memory())),
        ["catalog", dir] => Ok(catalog(CatalogStore::new(Box::new(FileStore::new(*dir))))),
        _ => Err(USAGE.to_string()),
    };

    result.unwrap_or_else(|msg| {
        eprintln!("{msg}");
        ExitCode::from(2)
    })
}

fn read_project(path: &Path) -> Result<Project, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let project: Project =
        serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))?;
    log::debug!(
        "read `{}` with {} top-level elements",
        project.name,
        project.elements.len()
    );
    Ok(project)
}

/// One line per element, two spaces per level. The current view is
/// marked with `*`.
fn outline(project: &Project) -> String {
    let mut out = format!("{}\n", project.name);
    walk(&project.elements, &mut |el, depth| {
        let marker = if el.id == project.current_view { " *" } else { "" };
        out.push_str(&format!(
            "{:indent$}{}{marker}\n",
            "",
            describe(el),
            indent = (depth + 1) * 2
        ));
    });
    out
}

fn describe(el: &Element) -> String {
    match el.name() {
        Some(name) => format!("{} [{}] {name}", el.id, el.kind),
        None => format!("{} [{}]", el.id, el.kind),
    }
}

/// Print diagnostics and return the number of warnings.
fn lint(project: &Project) -> usize {
    let diags = lint_project(project);
    let mut warnings = 0;
    for d in &diags {
        let level = match d.severity {
            LintSeverity::Warning => {
                warnings += 1;
                "warning"
            }
            LintSeverity::Info => "info",
        };
        let at = d.element_id.as_ref().map(ElementId::as_str).unwrap_or("-");
        println!("{level}[{}] {at}: {}", d.rule, d.message);
    }
    println!("{} diagnostics, {warnings} warnings", diags.len());
    warnings
}

fn catalog(store: CatalogStore) -> ExitCode {
    for t in store.list_templates() {
        let grid = t
            .grid
            .map(|g| format!(" grid {}×{}", g.rows, g.columns))
            .unwrap_or_default();
        println!(
            "{:<20} {:<24} {}×{}×{}{grid}",
            t.key, t.name, t.width, t.depth, t.height
        );
    }
    ExitCode::SUCCESS
}
