//! Catalog templates: definitions of placeable objects.
//!
//! Templates are independent of the layout tree. The editor turns a template
//! into a fresh `Element` with [`instantiate_template`] when the user drops
//! an object onto a floor.

use crate::id::ElementId;
use crate::model::{
    Element, ElementKind, Grid, KEY_COLOR, KEY_DEPTH, KEY_GRID, KEY_HEIGHT, KEY_NAME, KEY_WIDTH,
    KEY_X, KEY_Y, coerce_number,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_COLOR: &str = "#93c5fd";
const DEFAULT_NAME: &str = "custom";
const DEFAULT_WIDTH: f64 = 100.0;
const DEFAULT_DEPTH: f64 = 60.0;
const DEFAULT_HEIGHT: f64 = 100.0;
const DEFAULT_MAX_WEIGHT: f64 = 100.0;

/// Footprint shape of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    #[serde(rename = "rectangulo")]
    Rectangle,
    #[serde(rename = "circulo")]
    Circle,
}

/// Where an object is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mounting {
    #[default]
    #[serde(rename = "suelo")]
    Floor,
    #[serde(rename = "pared")]
    Wall,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub key: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "forma", default)]
    pub shape: Shape,
    pub color: String,
    #[serde(rename = "ancho")]
    pub width: f64,
    #[serde(rename = "largo")]
    pub depth: f64,
    #[serde(rename = "alto")]
    pub height: f64,
    /// Maximum supported weight.
    #[serde(rename = "pesoMax")]
    pub max_weight: f64,
    #[serde(rename = "ubicacion", default)]
    pub mounting: Mounting,
    #[serde(default)]
    pub grid: Option<Grid>,
}

/// User input for a custom template. Dimension fields accept numbers or
/// numeric strings, as they arrive from form inputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateDraft {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, rename = "nombre")]
    pub name: Option<String>,
    #[serde(default, rename = "forma")]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "ancho")]
    pub width: Option<Value>,
    #[serde(default, rename = "largo")]
    pub depth: Option<Value>,
    #[serde(default, rename = "alto")]
    pub height: Option<Value>,
    #[serde(default, rename = "pesoMax")]
    pub max_weight: Option<Value>,
    #[serde(default, rename = "ubicacion")]
    pub mounting: Option<Mounting>,
    #[serde(default)]
    pub grid: Option<Grid>,
}

impl Template {
    /// Build a template from user input, filling every missing field.
    ///
    /// The key is the trimmed explicit key, or a slug of the name.
    pub fn from_draft(draft: &TemplateDraft) -> Self {
        let name = non_blank(draft.name.as_deref()).unwrap_or(DEFAULT_NAME);
        let key = non_blank(draft.key.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| slug(name));
        Self {
            key,
            name: name.to_string(),
            shape: draft.shape.unwrap_or_default(),
            color: non_blank(draft.color.as_deref())
                .unwrap_or(DEFAULT_COLOR)
                .to_string(),
            width: coerce_dimension(draft.width.as_ref(), DEFAULT_WIDTH),
            depth: coerce_dimension(draft.depth.as_ref(), DEFAULT_DEPTH),
            height: coerce_dimension(draft.height.as_ref(), DEFAULT_HEIGHT),
            max_weight: coerce_dimension(draft.max_weight.as_ref(), DEFAULT_MAX_WEIGHT),
            mounting: draft.mounting.unwrap_or_default(),
            grid: draft.grid,
        }
    }
}

/// Lowercase `s` and replace each whitespace run with a single `-`.
pub fn slug(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Numeric coercion for form input: numbers and numeric strings pass,
/// anything zero, non-finite, or unparsable falls back to `default`.
fn coerce_dimension(value: Option<&Value>, default: f64) -> f64 {
    match value.and_then(coerce_number) {
        Some(n) if n != 0.0 => n,
        _ => {
            log::debug!("template dimension {value:?} unusable; using {default}");
            default
        }
    }
}

/// The catalog every fresh install starts with.
pub fn builtin_templates() -> Vec<Template> {
    let t = |key: &str,
             name: &str,
             shape: Shape,
             color: &str,
             (width, depth, height): (f64, f64, f64),
             max_weight: f64,
             mounting: Mounting| Template {
        key: key.into(),
        name: name.into(),
        shape,
        color: color.into(),
        width,
        depth,
        height,
        max_weight,
        mounting,
        grid: None,
    };

    let mut container = t(
        "contenedor-grid",
        "Contenedor (grid)",
        Shape::Rectangle,
        "#a3e635",
        (240.0, 120.0, 200.0),
        1000.0,
        Mounting::Floor,
    );
    container.grid = Some(Grid {
        rows: 2,
        columns: 3,
    });

    vec![
        t(
            "anaquel-3-pisos",
            "Anaquel 3 pisos",
            Shape::Rectangle,
            "#93c5fd",
            (200.0, 80.0, 200.0),
            500.0,
            Mounting::Floor,
        ),
        t(
            "estantes-2-pisos",
            "Estantes 2 pisos",
            Shape::Rectangle,
            "#60a5fa",
            (160.0, 60.0, 180.0),
            300.0,
            Mounting::Wall,
        ),
        t(
            "barril",
            "Barril",
            Shape::Circle,
            "#f59e0b",
            (60.0, 60.0, 90.0),
            80.0,
            Mounting::Floor,
        ),
        t(
            "pila-barriles-3",
            "Pila de barriles (3)",
            Shape::Rectangle,
            "#fbbf24",
            (180.0, 60.0, 180.0),
            240.0,
            Mounting::Floor,
        ),
        container,
    ]
}

/// Create a new placed object from `template` at the origin of its parent.
///
/// The element kind is the template key, so the catalog entry can be found
/// again from the placed object.
pub fn instantiate_template(template: &Template) -> Element {
    let mut el = Element::new(
        ElementId::generate(&template.key),
        ElementKind::Object(template.key.clone()),
    );
    el.set_prop(KEY_X, 0);
    el.set_prop(KEY_Y, 0);
    el.set_prop(KEY_WIDTH, template.width);
    el.set_prop(KEY_DEPTH, template.depth);
    el.set_prop(KEY_HEIGHT, template.height);
    el.custom
        .insert(KEY_COLOR.into(), Value::from(template.color.as_str()));
    el.custom
        .insert(KEY_NAME.into(), Value::from(template.name.as_str()));
    if let Some(grid) = template.grid {
        el.custom.insert(
            KEY_GRID.into(),
            serde_json::json!({ "filas": grid.rows, "columnas": grid.columns }),
        );
    }
    el
}
