//! Editing engine for FP projects.
//!
//! [`store::LayoutStore`] owns the live project, the single-slot move
//! buffer, and the undo/redo [`history::History`]. [`catalog::CatalogStore`]
//! owns the template list. Both write through a [`persist::KeyValueStore`].

pub mod catalog;
pub mod history;
pub mod persist;
pub mod store;

pub use catalog::CatalogStore;
pub use history::History;
pub use persist::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{EditorState, ImportError, LayoutStore, StoreConfig};
