//! Update wrapper.
//!
//! `update_one` and `update_many` fire the update phases; `upsert` fires
//! the upsert phases and always inserts on a filter miss. When a
//! replacement is set, `update_one` and `upsert` send it in place of the
//! update expression and hooks see no update expression.

use hookstore_hooks::{HookResult, OperationContext, OperationPhase, SharedModelHook};
use hookstore_model::Model;
use hookstore_types::{CallOptions, Filter, UpdateExpr, UpdateOptions, UpdateResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::chain::HookChain;
use crate::collection::Target;
use crate::{ClientResult, DocumentStore, pipeline};

/// What a local update hook sees. `result` is set for after hooks only.
pub struct UpdaterContext<'a, T> {
    pub collection: &'a str,
    pub filter: &'a mut Filter,
    pub updates: Option<&'a mut UpdateExpr>,
    pub replacement: Option<&'a mut T>,
    pub options: &'a CallOptions,
    pub model_hook: Option<&'a SharedModelHook>,
    pub result: Option<&'a UpdateResult>,
}

pub type UpdaterHookFn<T> = dyn Fn(&mut UpdaterContext<'_, T>) -> HookResult + Send + Sync;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Verb {
    UpdateOne,
    UpdateMany,
    Upsert,
}

impl Verb {
    fn phases(self) -> ([OperationPhase; 1], [OperationPhase; 1]) {
        match self {
            Verb::UpdateOne | Verb::UpdateMany => {
                ([OperationPhase::BeforeUpdate], [OperationPhase::AfterUpdate])
            }
            Verb::Upsert => ([OperationPhase::BeforeUpsert], [OperationPhase::AfterUpsert]),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Verb::UpdateOne => "update_one",
            Verb::UpdateMany => "update_many",
            Verb::Upsert => "upsert",
        }
    }
}

/// Modifies `T` documents in one collection.
pub struct Updater<T, S: ?Sized> {
    target: Target<S>,
    filter: Filter,
    updates: UpdateExpr,
    replacement: Option<T>,
    options: UpdateOptions,
    model_hook: Option<SharedModelHook>,
    before: HookChain<UpdaterHookFn<T>>,
    after: HookChain<UpdaterHookFn<T>>,
}

impl<T, S> Updater<T, S>
where
    T: Model + Default + Serialize + DeserializeOwned + 'static,
    S: DocumentStore + ?Sized,
{
    pub(crate) fn new(target: Target<S>) -> Self {
        Self {
            target,
            filter: Filter::new(),
            updates: UpdateExpr::default(),
            replacement: None,
            options: UpdateOptions::default(),
            model_hook: None,
            before: HookChain::new(),
            after: HookChain::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn updates(mut self, updates: impl Into<UpdateExpr>) -> Self {
        self.updates = updates.into();
        self
    }

    /// A whole document to store instead of applying `updates`.
    #[must_use]
    pub fn replacement(mut self, doc: T) -> Self {
        self.replacement = Some(doc);
        self
    }

    #[must_use]
    pub fn options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn model_hook(mut self, hook: SharedModelHook) -> Self {
        self.model_hook = Some(hook);
        self
    }

    #[must_use]
    pub fn register_before_hooks<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut UpdaterContext<'_, T>) -> HookResult + Send + Sync + 'static,
    {
        self.before.add(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn register_after_hooks<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut UpdaterContext<'_, T>) -> HookResult + Send + Sync + 'static,
    {
        self.after.add(Arc::new(hook));
        self
    }

    pub fn reset_hooks(&mut self) {
        self.before.clear();
        self.after.clear();
    }

    pub async fn update_one(self) -> ClientResult<UpdateResult> {
        self.execute(Verb::UpdateOne).await
    }

    /// Applies `updates` to every match. A replacement is ignored.
    pub async fn update_many(mut self) -> ClientResult<UpdateResult> {
        self.replacement = None;
        self.execute(Verb::UpdateMany).await
    }

    /// Updates the first match, inserting when nothing matches.
    pub async fn upsert(mut self) -> ClientResult<UpdateResult> {
        self.options.upsert = true;
        self.execute(Verb::Upsert).await
    }

    async fn execute(mut self, verb: Verb) -> ClientResult<UpdateResult> {
        let name = self.target.name();
        let (before, after) = verb.phases();
        let call_options = CallOptions::Update(self.options.clone());
        let replacing = self.replacement.is_some();

        {
            let mut template = T::default();
            let mut ctx = OperationContext::new(name)
                .with_document(&mut template)
                .with_filter(&mut self.filter)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            match self.replacement.as_mut() {
                Some(doc) => ctx = ctx.with_replacement(doc),
                None => ctx = ctx.with_updates(&mut self.updates),
            }
            pipeline::before(self.target.registry(), &mut ctx, &before)?;
        }
        {
            let mut ctx = UpdaterContext {
                collection: name,
                filter: &mut self.filter,
                updates: (!replacing).then_some(&mut self.updates),
                replacement: self.replacement.as_mut(),
                options: &call_options,
                model_hook: self.model_hook.as_ref(),
                result: None,
            };
            self.before.run(|hook| hook(&mut ctx))?;
        }

        debug!(collection = name, verb = verb.as_str(), replacing, "update");
        let store = self.target.store();
        let result = match (&self.replacement, verb) {
            (Some(doc), Verb::UpdateOne | Verb::Upsert) => {
                let doc = pipeline::to_document(doc)?;
                store.replace_one(name, &self.filter, doc, &self.options).await?
            }
            (_, Verb::UpdateMany) => {
                store
                    .update_many(name, &self.filter, &self.updates, &self.options)
                    .await?
            }
            _ => {
                store
                    .update_one(name, &self.filter, &self.updates, &self.options)
                    .await?
            }
        };

        {
            let mut template = T::default();
            let mut ctx = OperationContext::new(name)
                .with_document(&mut template)
                .with_filter(&mut self.filter)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            match self.replacement.as_mut() {
                Some(doc) => ctx = ctx.with_replacement(doc),
                None => ctx = ctx.with_updates(&mut self.updates),
            }
            pipeline::after(self.target.registry(), &mut ctx, &after)?;
        }
        let mut ctx = UpdaterContext {
            collection: name,
            filter: &mut self.filter,
            updates: (!replacing).then_some(&mut self.updates),
            replacement: self.replacement.as_mut(),
            options: &call_options,
            model_hook: self.model_hook.as_ref(),
            result: Some(&result),
        };
        pipeline::local_after(self.after.run(|hook| hook(&mut ctx)), &after)?;
        Ok(result)
    }
}

impl<T, S: ?Sized> fmt::Debug for Updater<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("collection", &self.target.name())
            .field("filter", &self.filter)
            .field("updates", &self.updates)
            .field("replacing", &self.replacement.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
