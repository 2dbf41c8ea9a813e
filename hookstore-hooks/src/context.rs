//! The per-call operation context.

use hookstore_model::Model;
use hookstore_types::{CallOptions, Filter, UpdateExpr};
use std::fmt;

use crate::{HookResult, SharedModelHook};

/// The document payload of a call: one value or an ordered list.
///
/// Wrappers know statically which shape they hand over, so hooks never
/// inspect runtime types to tell the two apart.
pub enum Payload<'a> {
    One(&'a mut dyn Model),
    Many(Vec<&'a mut dyn Model>),
}

impl<'a> Payload<'a> {
    /// Borrows every element of `docs` as a list payload.
    pub fn many<T: Model>(docs: &'a mut [T]) -> Self {
        Self::Many(docs.iter_mut().map(|doc| doc as &mut dyn Model).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(docs) => docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every element in order, stopping at the first error.
    pub fn try_for_each(
        &mut self,
        mut f: impl FnMut(&mut dyn Model) -> HookResult,
    ) -> HookResult {
        match self {
            Self::One(doc) => f(&mut **doc),
            Self::Many(docs) => {
                for doc in docs.iter_mut() {
                    f(&mut **doc)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(_) => f.write_str("Payload::One"),
            Self::Many(docs) => write!(f, "Payload::Many({})", docs.len()),
        }
    }
}

/// Everything the pipeline knows about one CRUD call.
///
/// Built once per call with [`OperationContext::new`] and the `with_*`
/// setters. Every field except the collection name is optional; callbacks
/// mutate the borrowed filter, update expression and payload in place, and
/// the wrapper sends whatever they leave behind.
pub struct OperationContext<'a> {
    pub collection: &'a str,
    pub document: Option<Payload<'a>>,
    pub filter: Option<&'a mut Filter>,
    pub updates: Option<&'a mut UpdateExpr>,
    pub replacement: Option<&'a mut dyn Model>,
    pub options: Option<&'a CallOptions>,
    /// Probed for lifecycle capabilities by the model-hook plugin. May be
    /// unrelated to the payload.
    pub model_hook: Option<SharedModelHook>,
}

impl<'a> OperationContext<'a> {
    pub fn new(collection: &'a str) -> Self {
        Self {
            collection,
            document: None,
            filter: None,
            updates: None,
            replacement: None,
            options: None,
            model_hook: None,
        }
    }

    #[must_use]
    pub fn with_document(mut self, doc: &'a mut dyn Model) -> Self {
        self.document = Some(Payload::One(doc));
        self
    }

    #[must_use]
    pub fn with_documents(mut self, docs: Vec<&'a mut dyn Model>) -> Self {
        self.document = Some(Payload::Many(docs));
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload<'a>) -> Self {
        self.document = Some(payload);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: &'a mut Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_updates(mut self, updates: &'a mut UpdateExpr) -> Self {
        self.updates = Some(updates);
        self
    }

    #[must_use]
    pub fn with_replacement(mut self, replacement: &'a mut dyn Model) -> Self {
        self.replacement = Some(replacement);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: &'a CallOptions) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn with_model_hook(mut self, hook: impl Into<Option<SharedModelHook>>) -> Self {
        self.model_hook = hook.into();
        self
    }
}

impl fmt::Debug for OperationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("collection", &self.collection)
            .field("document", &self.document)
            .field("filter", &self.filter)
            .field("updates", &self.updates)
            .field("replacement", &self.replacement.is_some())
            .field("options", &self.options)
            .field("model_hook", &self.model_hook.is_some())
            .finish()
    }
}
