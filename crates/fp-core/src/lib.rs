pub mod catalog;
pub mod id;
pub mod index;
pub mod lint;
pub mod model;

pub use catalog::{Mounting, Shape, Template, TemplateDraft, builtin_templates, instantiate_template};
pub use id::ElementId;
pub use index::{IdPath, find_element, find_element_mut, find_parent, find_parent_mut, path_to, walk};
pub use lint::{LintDiagnostic, LintSeverity, lint_project};
pub use model::*;
