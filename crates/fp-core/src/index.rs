//! Tree index: recursive lookups over the element tree.
//!
//! Every query is a depth-first, pre-order walk that visits children in list
//! order and stops at the first match, so results are deterministic even if
//! an imported project breaks id uniqueness. All queries are O(n) reads.

use crate::id::ElementId;
use crate::model::Element;
use smallvec::SmallVec;

/// Id path from a top-level element down to a node (inclusive).
pub type IdPath = SmallVec<[ElementId; 8]>;

/// Child-position path from a top-level element down to a node.
type IndexPath = SmallVec<[usize; 8]>;

/// Find the element with `id` anywhere under `elements`.
pub fn find_element(id: ElementId, elements: &[Element]) -> Option<&Element> {
    for el in elements {
        if el.id == id {
            return Some(el);
        }
        if let Some(found) = find_element(id, &el.children) {
            return Some(found);
        }
    }
    None
}

/// Mutable variant of [`find_element`].
pub fn find_element_mut(id: ElementId, elements: &mut [Element]) -> Option<&mut Element> {
    let path = index_path(id, elements)?;
    descend_mut(elements, &path)
}

/// Find the direct owner of the element with `id`.
///
/// Returns `None` for top-level elements (the root has no owner) and for
/// unknown ids.
pub fn find_parent(id: ElementId, elements: &[Element]) -> Option<&Element> {
    let path = index_path(id, elements)?;
    let (_, parent_path) = path.split_last()?;
    if parent_path.is_empty() {
        return None;
    }
    descend(elements, parent_path)
}

/// Mutable variant of [`find_parent`].
pub fn find_parent_mut(id: ElementId, elements: &mut [Element]) -> Option<&mut Element> {
    let path = index_path(id, elements)?;
    let (_, parent_path) = path.split_last()?;
    if parent_path.is_empty() {
        return None;
    }
    descend_mut(elements, parent_path)
}

/// Ids from the top-level element down to `id`, for breadcrumbs.
pub fn path_to(id: ElementId, elements: &[Element]) -> Option<IdPath> {
    let path = index_path(id, elements)?;
    let mut ids = IdPath::new();
    let mut level = elements;
    for &i in &path {
        let el = &level[i];
        ids.push(el.id);
        level = &el.children;
    }
    Some(ids)
}

/// Visit every element in pre-order with its depth (top level = 0).
pub fn walk<'a>(elements: &'a [Element], visit: &mut impl FnMut(&'a Element, usize)) {
    walk_at(elements, 0, visit);
}

fn walk_at<'a>(elements: &'a [Element], depth: usize, visit: &mut impl FnMut(&'a Element, usize)) {
    for el in elements {
        visit(el, depth);
        walk_at(&el.children, depth + 1, visit);
    }
}

// ─── Internals ───────────────────────────────────────────────────────────

fn index_path(id: ElementId, elements: &[Element]) -> Option<IndexPath> {
    let mut path = IndexPath::new();
    if search(id, elements, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn search(id: ElementId, elements: &[Element], path: &mut IndexPath) -> bool {
    for (i, el) in elements.iter().enumerate() {
        path.push(i);
        if el.id == id || search(id, &el.children, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn descend<'a>(elements: &'a [Element], path: &[usize]) -> Option<&'a Element> {
    let (&first, rest) = path.split_first()?;
    let mut node = elements.get(first)?;
    for &i in rest {
        node = node.children.get(i)?;
    }
    Some(node)
}

fn descend_mut<'a>(elements: &'a mut [Element], path: &[usize]) -> Option<&'a mut Element> {
    let (&first, rest) = path.split_first()?;
    let mut node = elements.get_mut(first)?;
    for &i in rest {
        node = node.children.get_mut(i)?;
    }
    Some(node)
}
