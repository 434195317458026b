//! Lint diagnostics for FP projects.
//!
//! Reports invariant violations without modifying the project. Imported or
//! hand-edited files are the usual source; the layout store refuses taken
//! ids and retargets detached views, so its own edits stay clean. Results
//! feed `fp lint` and the import log.

use crate::id::ElementId;
use crate::index::walk;
use crate::model::{ElementKind, Project};
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Breaks an invariant the editor relies on.
    Warning,
    /// Harmless, but probably not intended.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The element this diagnostic refers to, when there is one.
    pub element_id: Option<ElementId>,
    /// Human-readable message.
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "duplicate-id", "dangling-view").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules over the project and return diagnostics.
#[must_use]
pub fn lint_project(project: &Project) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(project, &mut diags);
    lint_root(project, &mut diags);
    lint_views(project, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_duplicate_ids(project: &Project, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    walk(&project.elements, &mut |el, _| {
        if !seen.insert(el.id) && reported.insert(el.id) {
            diags.push(LintDiagnostic {
                element_id: Some(el.id),
                message: format!("Id `{}` is used by more than one element.", el.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    });
}

/// The root must exist, be a floor or a building, and a building root
/// should only hold floors.
fn lint_root(project: &Project, diags: &mut Vec<LintDiagnostic>) {
    let Some(root) = project.root() else {
        diags.push(LintDiagnostic {
            element_id: None,
            message: "Project has no element with id `root`.".into(),
            severity: LintSeverity::Warning,
            rule: "missing-root",
        });
        return;
    };

    match root.kind {
        ElementKind::Floor => {}
        ElementKind::Building => {
            for child in root.children.iter().filter(|c| !c.is_floor()) {
                diags.push(LintDiagnostic {
                    element_id: Some(child.id),
                    message: format!(
                        "`{}` ({}) sits directly in the building; place it on a floor.",
                        child.id, child.kind
                    ),
                    severity: LintSeverity::Info,
                    rule: "object-outside-floor",
                });
            }
        }
        ref other => diags.push(LintDiagnostic {
            element_id: Some(root.id),
            message: format!("Root is `{other}`; expected `planta` or `edificio`."),
            severity: LintSeverity::Warning,
            rule: "root-kind",
        }),
    }
}

fn lint_views(project: &Project, diags: &mut Vec<LintDiagnostic>) {
    if !project.contains(project.current_view) {
        diags.push(LintDiagnostic {
            element_id: Some(project.current_view),
            message: format!(
                "Current view `{}` does not resolve to an element.",
                project.current_view
            ),
            severity: LintSeverity::Warning,
            rule: "dangling-view",
        });
    }
    let mut reported = HashSet::new();
    for &id in &project.view_history {
        if !project.contains(id) && reported.insert(id) {
            diags.push(LintDiagnostic {
                element_id: Some(id),
                message: format!("Back history mentions `{id}`, which no longer exists."),
                severity: LintSeverity::Info,
                rule: "dangling-history",
            });
        }
    }
}
