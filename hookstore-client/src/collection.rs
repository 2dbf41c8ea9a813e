//! Typed collection handle.

use hookstore_hooks::{CallbackRegistry, global};
use hookstore_model::Model;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Aggregator, Creator, Deleter, DocumentStore, Finder, Updater};

/// Where a wrapper sends its calls: store, collection name and registry.
pub(crate) struct Target<S: ?Sized> {
    store: Arc<S>,
    collection: String,
    registry: Arc<CallbackRegistry>,
}

impl<S: ?Sized> Target<S> {
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn name(&self) -> &str {
        &self.collection
    }

    pub(crate) fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }
}

impl<S: ?Sized> Clone for Target<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S: ?Sized> fmt::Debug for Target<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("collection", &self.collection)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// A collection of `T` documents in store `S`.
///
/// Hands out one wrapper per verb family. Every wrapper runs its calls
/// through the callback registry the collection was built with; unless
/// [`with_registry`](Self::with_registry) is used that is the process-wide
/// [`global`] registry.
///
/// ```
/// use hookstore_client::{Collection, MemoryStore};
/// use hookstore_model::{Base, DefaultFields, Model};
/// use std::sync::Arc;
///
/// #[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
/// struct Note {
///     #[serde(flatten)]
///     base: Base,
///     text: String,
/// }
///
/// impl Model for Note {
///     fn as_default_fields(&mut self) -> Option<&mut dyn DefaultFields> {
///         Some(&mut self.base)
///     }
/// }
///
/// let notes: Collection<Note, MemoryStore> = Collection::new(Arc::new(MemoryStore::new()), "notes");
/// assert_eq!(notes.name(), "notes");
/// ```
pub struct Collection<T, S: ?Sized> {
    target: Target<S>,
    _model: PhantomData<fn() -> T>,
}

impl<T, S: DocumentStore + ?Sized> Collection<T, S> {
    pub fn new(store: Arc<S>, name: impl Into<String>) -> Self {
        Self {
            target: Target {
                store,
                collection: name.into(),
                registry: global(),
            },
            _model: PhantomData,
        }
    }

    /// Uses `registry` instead of the global one for every wrapper created
    /// from now on.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<CallbackRegistry>) -> Self {
        self.target.registry = registry;
        self
    }

    pub fn name(&self) -> &str {
        self.target.name()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.target.store
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.target.registry
    }
}

impl<T, S> Collection<T, S>
where
    T: Model + Serialize + DeserializeOwned + 'static,
    S: DocumentStore + ?Sized,
{
    pub fn creator(&self) -> Creator<T, S> {
        Creator::new(self.target.clone())
    }

    pub fn deleter(&self) -> Deleter<T, S> {
        Deleter::new(self.target.clone())
    }

    pub fn aggregator(&self) -> Aggregator<T, S> {
        Aggregator::new(self.target.clone())
    }
}

impl<T, S> Collection<T, S>
where
    T: Model + Default + Serialize + DeserializeOwned + 'static,
    S: DocumentStore + ?Sized,
{
    pub fn finder(&self) -> Finder<T, S> {
        Finder::new(self.target.clone())
    }

    pub fn updater(&self) -> Updater<T, S> {
        Updater::new(self.target.clone())
    }
}

impl<T, S: ?Sized> Clone for Collection<T, S> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            _model: PhantomData,
        }
    }
}

impl<T, S: ?Sized> fmt::Debug for Collection<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.target.collection)
            .finish_non_exhaustive()
    }
}
