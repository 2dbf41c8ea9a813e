//! Shared fixtures for client tests.

#![allow(dead_code)]

use hookstore_client::{Collection, MemoryStore};
use hookstore_hooks::{CallbackRegistry, PluginConfig};
use hookstore_model::{Base, DefaultFields, Model, Validate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    #[serde(flatten)]
    pub base: Base,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0))]
    pub age: i64,
}

impl User {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_string(),
            age,
            ..Self::default()
        }
    }
}

impl Model for User {
    fn as_default_fields(&mut self) -> Option<&mut dyn DefaultFields> {
        Some(&mut self.base)
    }

    fn as_validate(&self) -> Option<&dyn Validate> {
        Some(self)
    }
}

/// A model with no capabilities at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
}

impl Model for Tag {}

/// A `users` collection over a fresh store with its own registry.
pub fn users() -> (Arc<MemoryStore>, Arc<CallbackRegistry>, Collection<User, MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(CallbackRegistry::new());
    let users = Collection::new(Arc::clone(&store), "users").with_registry(Arc::clone(&registry));
    (store, registry, users)
}

/// Same as [`users`], with every built-in plugin installed.
pub fn users_with_plugins() -> (Arc<MemoryStore>, Arc<CallbackRegistry>, Collection<User, MemoryStore>) {
    let (store, registry, users) = users();
    PluginConfig::enable_all().install(&registry);
    (store, registry, users)
}

/// Inserts `people` directly, bypassing every hook.
pub async fn seed(store: &MemoryStore, collection: &str, people: &[User]) {
    use hookstore_client::DocumentStore;
    use hookstore_types::InsertManyOptions;

    let docs = people
        .iter()
        .map(|p| match serde_json::to_value(p).unwrap() {
            serde_json::Value::Object(doc) => doc,
            other => panic!("not a document: {other}"),
        })
        .collect();
    store
        .insert_many(collection, docs, &InsertManyOptions::default())
        .await
        .unwrap();
}
