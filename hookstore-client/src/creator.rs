//! Insert wrapper.

use hookstore_hooks::{OperationContext, OperationPhase, Payload, SharedModelHook, HookResult};
use hookstore_model::Model;
use hookstore_types::{
    CallOptions, InsertManyOptions, InsertManyResult, InsertOneOptions, InsertOneResult,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::chain::HookChain;
use crate::collection::Target;
use crate::{ClientResult, DocumentStore, pipeline};

const BEFORE: [OperationPhase; 1] = [OperationPhase::BeforeInsert];
const AFTER: [OperationPhase; 1] = [OperationPhase::AfterInsert];

/// What a local insert hook sees.
pub struct CreatorContext<'a, T> {
    pub collection: &'a str,
    /// The payload; a single insert is a one-element slice.
    pub docs: &'a mut [T],
    pub options: &'a CallOptions,
    pub model_hook: Option<&'a SharedModelHook>,
    /// Ids reported by the store. Empty before the insert.
    pub inserted_ids: &'a [Value],
}

/// A local insert hook.
pub type CreatorHookFn<T> = dyn Fn(&mut CreatorContext<'_, T>) -> HookResult + Send + Sync;

/// Inserts `T` values into one collection.
pub struct Creator<T, S: ?Sized> {
    target: Target<S>,
    model_hook: Option<SharedModelHook>,
    before: HookChain<CreatorHookFn<T>>,
    after: HookChain<CreatorHookFn<T>>,
}

impl<T, S> Creator<T, S>
where
    T: Model + Serialize + DeserializeOwned + 'static,
    S: DocumentStore + ?Sized,
{
    pub(crate) fn new(target: Target<S>) -> Self {
        Self {
            target,
            model_hook: None,
            before: HookChain::new(),
            after: HookChain::new(),
        }
    }

    /// Sets the value probed for lifecycle methods on every call.
    #[must_use]
    pub fn model_hook(mut self, hook: SharedModelHook) -> Self {
        self.model_hook = Some(hook);
        self
    }

    /// Appends a hook that runs after the global before-insert callbacks.
    #[must_use]
    pub fn register_before_hooks<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut CreatorContext<'_, T>) -> HookResult + Send + Sync + 'static,
    {
        self.before.add(Arc::new(hook));
        self
    }

    /// Appends a hook that runs after the global after-insert callbacks.
    #[must_use]
    pub fn register_after_hooks<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut CreatorContext<'_, T>) -> HookResult + Send + Sync + 'static,
    {
        self.after.add(Arc::new(hook));
        self
    }

    /// Drops every local hook.
    pub fn reset_hooks(&mut self) {
        self.before.clear();
        self.after.clear();
    }

    pub async fn insert_one(&self, doc: &mut T) -> ClientResult<InsertOneResult> {
        self.insert_one_with(doc, InsertOneOptions::default()).await
    }

    /// Inserts `doc`. Hooks may modify it in place before it is sent; the
    /// caller sees those changes.
    pub async fn insert_one_with(
        &self,
        doc: &mut T,
        options: InsertOneOptions,
    ) -> ClientResult<InsertOneResult> {
        let name = self.target.name();
        let call_options = CallOptions::InsertOne(options.clone());

        {
            let mut ctx = OperationContext::new(name)
                .with_document(&mut *doc)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::before(self.target.registry(), &mut ctx, &BEFORE)?;
        }
        self.run_local(&self.before, std::slice::from_mut(doc), &call_options, &[])?;

        debug!(collection = name, "insert_one");
        let result = self
            .target
            .store()
            .insert_one(name, pipeline::to_document(&*doc)?, &options)
            .await?;

        {
            let mut ctx = OperationContext::new(name)
                .with_document(&mut *doc)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::after(self.target.registry(), &mut ctx, &AFTER)?;
        }
        let ids = std::slice::from_ref(&result.inserted_id);
        pipeline::local_after(
            self.run_local(&self.after, std::slice::from_mut(doc), &call_options, ids),
            &AFTER,
        )?;
        Ok(result)
    }

    pub async fn insert_many(&self, docs: &mut [T]) -> ClientResult<InsertManyResult> {
        self.insert_many_with(docs, InsertManyOptions::default()).await
    }

    /// Inserts `docs` in order as one batch.
    pub async fn insert_many_with(
        &self,
        docs: &mut [T],
        options: InsertManyOptions,
    ) -> ClientResult<InsertManyResult> {
        let name = self.target.name();
        let call_options = CallOptions::InsertMany(options.clone());

        {
            let mut ctx = OperationContext::new(name)
                .with_payload(Payload::many(&mut *docs))
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::before(self.target.registry(), &mut ctx, &BEFORE)?;
        }
        self.run_local(&self.before, docs, &call_options, &[])?;

        let batch = docs
            .iter()
            .map(pipeline::to_document)
            .collect::<ClientResult<Vec<_>>>()?;
        debug!(collection = name, count = batch.len(), "insert_many");
        let result = self
            .target
            .store()
            .insert_many(name, batch, &options)
            .await?;

        {
            let mut ctx = OperationContext::new(name)
                .with_payload(Payload::many(&mut *docs))
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::after(self.target.registry(), &mut ctx, &AFTER)?;
        }
        pipeline::local_after(
            self.run_local(&self.after, docs, &call_options, &result.inserted_ids),
            &AFTER,
        )?;
        Ok(result)
    }

    fn run_local(
        &self,
        chain: &HookChain<CreatorHookFn<T>>,
        docs: &mut [T],
        options: &CallOptions,
        inserted_ids: &[Value],
    ) -> HookResult {
        let mut ctx = CreatorContext {
            collection: self.target.name(),
            docs,
            options,
            model_hook: self.model_hook.as_ref(),
            inserted_ids,
        };
        chain.run(|hook| hook(&mut ctx))
    }
}

impl<T, S: ?Sized> fmt::Debug for Creator<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creator")
            .field("collection", &self.target.name())
            .field("before", &self.before)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}
