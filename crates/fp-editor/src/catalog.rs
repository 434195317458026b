//! Catalog store: the list of placeable templates.
//!
//! Independent of the layout tree and of undo history. Seeded with the
//! built-in templates; a persisted list, when present, replaces them.

use crate::persist::{self, KeyValueStore, MemoryStore};
use fp_core::catalog::{Template, TemplateDraft, builtin_templates};

pub struct CatalogStore {
    items: Vec<Template>,
    storage: Box<dyn KeyValueStore>,
}

impl CatalogStore {
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        let items = persist::load_catalog(storage.as_ref()).unwrap_or_else(builtin_templates);
        Self { items, storage }
    }

    /// Built-in templates over a throwaway in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn list_templates(&self) -> &[Template] {
        &self.items
    }

    /// First template with `key`.
    pub fn template(&self, key: &str) -> Option<&Template> {
        self.items.iter().find(|t| t.key == key)
    }

    /// Build a template from user input, append it, and persist the list.
    ///
    /// Keys are not deduplicated: a repeated key is appended, and
    /// [`template`](Self::template) keeps returning the first one.
    pub fn define_custom_template(&mut self, draft: &TemplateDraft) -> Template {
        let template = Template::from_draft(draft);
        if self.template(&template.key).is_some() {
            log::warn!("catalog already has a template `{}`", template.key);
        }
        self.items.push(template.clone());
        if let Err(e) = persist::save_catalog(self.storage.as_mut(), &self.items) {
            log::warn!("saving catalog failed, continuing in memory: {e}");
        }
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{CATALOG_KEY, StorageError};
    use fp_core::catalog::Shape;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn starts_with_builtins() {
        let catalog = CatalogStore::in_memory();
        assert_eq!(catalog.list_templates().len(), 5);
        let barrel = catalog.template("barril").unwrap();
        assert_eq!(barrel.shape, Shape::Circle);
        assert!(catalog.template("nope").is_none());
    }

    #[test]
    fn custom_template_is_appended_and_persisted() {
        let store = MemoryStore::new();
        let mut catalog = CatalogStore::new(Box::new(store.clone()));
        let draft: TemplateDraft =
            serde_json::from_value(json!({ "nombre": "Mesa de trabajo", "ancho": "120" })).unwrap();
        let t = catalog.define_custom_template(&draft);

        assert_eq!(t.key, "mesa-de-trabajo");
        assert_eq!(t.width, 120.0);
        assert_eq!(catalog.list_templates().len(), 6);
        assert_eq!(catalog.template("mesa-de-trabajo"), Some(&t));
        assert!(store.get(CATALOG_KEY).unwrap().is_some());

        let reopened = CatalogStore::new(Box::new(store));
        assert_eq!(reopened.list_templates().len(), 6);
        assert_eq!(reopened.template("mesa-de-trabajo"), Some(&t));
    }

    #[test]
    fn persisted_list_replaces_builtins() {
        let mut store = MemoryStore::new();
        let only = vec![builtin_templates().remove(2)];
        persist::save_catalog(&mut store, &only).unwrap();

        let catalog = CatalogStore::new(Box::new(store));
        assert_eq!(catalog.list_templates(), only.as_slice());
    }

    #[test]
    fn broken_storage_still_works_in_memory() {
        let mut catalog = CatalogStore::new(Box::new(BrokenStore));
        assert_eq!(catalog.list_templates().len(), 5);
        catalog.define_custom_template(&TemplateDraft::default());
        assert_eq!(catalog.list_templates().len(), 6);
        assert!(catalog.template("custom").is_some());
    }
}
