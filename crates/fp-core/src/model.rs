//! Core layout-tree data model for FP projects.
//!
//! A project is a strictly-owned tree: every `Element` owns its `children`
//! exclusively, so cloning a `Project` is a full structural (deep) copy with
//! no shared substructure. The top of the tree is the element with id
//! `root`, which is either a floor (`planta`) or a building (`edificio`)
//! holding floors. Placed objects hang below floors and may themselves be
//! containers with a cell grid.
//!
//! Geometry and display fields are free-form JSON maps (`props` / `custom`)
//! so the wire format round-trips unknown keys untouched. Typed accessors
//! cover the keys the editor logic depends on.

use crate::id::ElementId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Free-form property map (`props` / `custom` on the wire).
pub type PropMap = Map<String, Value>;

// ─── Well-known keys ─────────────────────────────────────────────────────

pub const KEY_X: &str = "x";
pub const KEY_Y: &str = "y";
pub const KEY_WIDTH: &str = "ancho";
pub const KEY_DEPTH: &str = "largo";
pub const KEY_HEIGHT: &str = "alto";
pub const KEY_FLOOR_HEIGHT: &str = "altura";
pub const KEY_UNIT: &str = "unidad";
pub const KEY_COLOR: &str = "color";
pub const KEY_NAME: &str = "nombre";
pub const KEY_GRID: &str = "grid";

const DEFAULT_FLOOR_COLOR: &str = "#f3f4f6";

// ─── Element kind ────────────────────────────────────────────────────────

/// What an element is. Serialized as the plain `tipo` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Explicit root marker (`root`).
    Root,
    /// A floor (`planta`).
    Floor,
    /// A building holding floors (`edificio`).
    Building,
    /// A placed object instance, usually tagged with its catalog key.
    Object(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Root => "root",
            ElementKind::Floor => "planta",
            ElementKind::Building => "edificio",
            ElementKind::Object(key) => key,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "root" => ElementKind::Root,
            "planta" => ElementKind::Floor,
            "edificio" => ElementKind::Building,
            other => ElementKind::Object(other.to_string()),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementKind::parse(&s))
    }
}

// ─── Grid placement ──────────────────────────────────────────────────────

/// Cell grid declared by container objects in `custom.grid`.
///
/// Counts are read leniently: integers, floats and numeric strings are
/// accepted, and a missing or unreadable count becomes 0 (placed as 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    #[serde(rename = "filas", default, deserialize_with = "de_count")]
    pub rows: u32,
    #[serde(rename = "columnas", default, deserialize_with = "de_count")]
    pub columns: u32,
}

fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let n = coerce_number(&value).unwrap_or(0.0);
    // Saturating cast: negatives and NaN land on 0.
    Ok(n.trunc() as u32)
}

/// Read a JSON number or numeric string as `f64`. `true` counts as 1.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(true) => Some(1.0),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// A 1-indexed grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "fila")]
    pub row: u32,
    #[serde(rename = "columna")]
    pub column: u32,
}

impl Cell {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Resolved rectangle of one grid cell, relative to its container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
}

impl Grid {
    /// Rectangle of `cell` inside a container of `width` × `depth`.
    ///
    /// A zero row or column count is treated as one. Cells outside the grid
    /// are not rejected; their origin simply extrapolates past the container.
    pub fn cell_bounds(&self, width: f64, depth: f64, cell: Cell) -> CellBounds {
        let cell_w = width / f64::from(self.columns.max(1));
        let cell_d = depth / f64::from(self.rows.max(1));
        CellBounds {
            x: cell_w * (f64::from(cell.column) - 1.0),
            y: cell_d * (f64::from(cell.row) - 1.0),
            width: cell_w,
            depth: cell_d,
        }
    }
}

// ─── View selectors ──────────────────────────────────────────────────────

/// 2D projection axis used when drawing the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Xy,
    Zx,
    Zy,
}

impl ViewMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "xy" => Some(ViewMode::Xy),
            "zx" => Some(ViewMode::Zx),
            "zy" => Some(ViewMode::Zy),
            _ => None,
        }
    }
}

/// Which wall the elevation views face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallSide {
    #[default]
    #[serde(rename = "norte")]
    North,
    #[serde(rename = "sur")]
    South,
    #[serde(rename = "este")]
    East,
    #[serde(rename = "oeste")]
    West,
}

impl WallSide {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "norte" => Some(WallSide::North),
            "sur" => Some(WallSide::South),
            "este" => Some(WallSide::East),
            "oeste" => Some(WallSide::West),
            _ => None,
        }
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// One node of the layout tree.
///
/// `children` is always present in the normal form: leaves deserialize with
/// an empty list when `hijos` is missing and always serialize `hijos: []`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,

    #[serde(rename = "tipo")]
    pub kind: ElementKind,

    /// Geometry and semantic metadata.
    #[serde(default)]
    pub props: PropMap,

    /// Display metadata (colour, name, grid).
    #[serde(default)]
    pub custom: PropMap,

    #[serde(default, rename = "hijos")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            props: PropMap::new(),
            custom: PropMap::new(),
            children: Vec::new(),
        }
    }

    /// A floor with the default geometry (20 m × 15 m, 3 m high, in cm).
    pub fn floor(id: ElementId, name: Option<&str>) -> Self {
        let mut el = Self::new(id, ElementKind::Floor);
        el.props = default_floor_props();
        el.custom
            .insert(KEY_COLOR.into(), Value::from(DEFAULT_FLOOR_COLOR));
        if let Some(name) = name {
            el.custom.insert(KEY_NAME.into(), Value::from(name));
        }
        el
    }

    pub fn is_floor(&self) -> bool {
        self.kind == ElementKind::Floor
    }

    pub fn is_building(&self) -> bool {
        self.kind == ElementKind::Building
    }

    /// Numeric prop, if present and numeric.
    pub fn prop_f64(&self, key: &str) -> Option<f64> {
        self.props.get(key).and_then(Value::as_f64)
    }

    pub fn set_prop(&mut self, key: &str, value: impl Into<Value>) {
        self.props.insert(key.to_string(), value.into());
    }

    /// Display name from `custom.nombre`.
    pub fn name(&self) -> Option<&str> {
        self.custom.get(KEY_NAME).and_then(Value::as_str)
    }

    pub fn set_name(&mut self, name: &str) {
        self.custom.insert(KEY_NAME.into(), Value::from(name));
    }

    /// The container grid from `custom.grid`, if it is an object.
    pub fn grid(&self) -> Option<Grid> {
        let value = self.custom.get(KEY_GRID).filter(|v| !v.is_null())?;
        match Grid::deserialize(value) {
            Ok(grid) => Some(grid),
            Err(e) => {
                log::debug!("`{}` has an unusable grid ({e}); ignoring it", self.id);
                None
            }
        }
    }

    /// Shallow-merge `patch` into `props`: keys not in the patch are kept.
    pub fn merge_props(&mut self, patch: &PropMap) {
        merge_map(&mut self.props, patch);
    }

    /// Shallow-merge `patch` into `custom`.
    pub fn merge_custom(&mut self, patch: &PropMap) {
        merge_map(&mut self.custom, patch);
    }

    /// Position of the direct child with `id`.
    pub fn child_position(&self, id: ElementId) -> Option<usize> {
        self.children.iter().position(|c| c.id == id)
    }

    /// Total number of elements in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Element::subtree_len).sum::<usize>()
    }
}

/// Overwrite `dst[k]` with `src[k]` for every key in `src`.
fn merge_map(dst: &mut PropMap, src: &PropMap) {
    for (k, v) in src {
        dst.insert(k.clone(), v.clone());
    }
}

fn default_floor_props() -> PropMap {
    let mut props = PropMap::new();
    props.insert(KEY_X.into(), Value::from(0));
    props.insert(KEY_Y.into(), Value::from(0));
    props.insert(KEY_WIDTH.into(), Value::from(2000));
    props.insert(KEY_DEPTH.into(), Value::from(1500));
    props.insert(KEY_UNIT.into(), Value::from("cm"));
    props.insert(KEY_FLOOR_HEIGHT.into(), Value::from(300));
    props
}

// ─── Project ─────────────────────────────────────────────────────────────

/// The full layout document: metadata plus the element tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, rename = "nombre")]
    pub name: String,

    /// Model units to screen pixels.
    #[serde(default = "default_scale", rename = "escala")]
    pub scale: f64,

    #[serde(rename = "vistaActual")]
    pub current_view: ElementId,

    #[serde(default, rename = "vistaModo")]
    pub view_mode: ViewMode,

    #[serde(default, rename = "pared")]
    pub wall: WallSide,

    /// Previously visited views, most recent last.
    #[serde(default, rename = "historial")]
    pub view_history: Vec<ElementId>,

    #[serde(rename = "elementos")]
    pub elements: Vec<Element>,
}

fn default_scale() -> f64 {
    0.25
}

impl Default for Project {
    fn default() -> Self {
        let root = Element::floor(ElementId::root(), None);
        Self {
            name: "Distribución Planta 1".into(),
            scale: default_scale(),
            current_view: ElementId::root(),
            view_mode: ViewMode::Xy,
            wall: WallSide::North,
            view_history: Vec::new(),
            elements: vec![root],
        }
    }
}

impl Project {
    /// The element with id `root`.
    pub fn root(&self) -> Option<&Element> {
        crate::index::find_element(ElementId::root(), &self.elements)
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        crate::index::find_element_mut(ElementId::root(), &mut self.elements)
    }

    /// Whether `id` names an element somewhere in the tree.
    pub fn contains(&self, id: ElementId) -> bool {
        crate::index::find_element(id, &self.elements).is_some()
    }
}
