//! Query wrapper.
//!
//! `find_one` and `find` fire the find phases. `find_one_and_update` fires
//! the find and update phases together, find first. `count` and `distinct`
//! go straight to the store.

use hookstore_hooks::{HookResult, OperationContext, OperationPhase, Payload, SharedModelHook};
use hookstore_model::Model;
use hookstore_types::{
    CallOptions, CountOptions, Filter, FindOneAndUpdateOptions, FindOptions, UpdateExpr,
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

const FIND_BEFORE: [OperationPhase; 1] = [OperationPhase::BeforeFind];
const FIND_AFTER: [OperationPhase; 1] = [OperationPhase::AfterFind];
const FIND_UPDATE_BEFORE: [OperationPhase; 2] =
    [OperationPhase::BeforeFind, OperationPhase::BeforeUpdate];
const FIND_UPDATE_AFTER: [OperationPhase; 2] =
    [OperationPhase::AfterFind, OperationPhase::AfterUpdate];

/// What a local before-find hook sees.
pub struct FinderContext<'a> {
    pub collection: &'a str,
    pub filter: &'a mut Filter,
    /// Present only for `find_one_and_update`.
    pub updates: Option<&'a mut UpdateExpr>,
    pub options: &'a CallOptions,
    pub model_hook: Option<&'a SharedModelHook>,
}

/// What a local after-find hook sees: the query plus the decoded results.
pub struct FinderResultContext<'a, T> {
    pub collection: &'a str,
    pub filter: &'a Filter,
    pub updates: Option<&'a UpdateExpr>,
    pub options: &'a CallOptions,
    pub model_hook: Option<&'a SharedModelHook>,
    pub docs: &'a mut [T],
}

pub type FinderHookFn = dyn Fn(&mut FinderContext<'_>) -> HookResult + Send + Sync;

pub type FinderResultHookFn<T> =
    dyn Fn(&mut FinderResultContext<'_, T>) -> HookResult + Send + Sync;

/// Reads `T` values from one collection.
///
/// Configure with [`filter`](Self::filter), [`updates`](Self::updates) and
/// [`options`](Self::options), then consume it with one query.
pub struct Finder<T, S: ?Sized> {
    target: Target<S>,
    filter: Filter,
    updates: Option<UpdateExpr>,
    options: FindOptions,
    model_hook: Option<SharedModelHook>,
    before: HookChain<FinderHookFn>,
    after: HookChain<FinderResultHookFn<T>>,
}

impl<T, S> Finder<T, S>
where
    T: Model + Default + Serialize + DeserializeOwned + 'static,
    S: DocumentStore + ?Sized,
{
    pub(crate) fn new(target: Target<S>) -> Self {
        Self {
            target,
            filter: Filter::new(),
            updates: None,
            options: FindOptions::default(),
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

    /// The update applied by [`find_one_and_update`](Self::find_one_and_update).
    #[must_use]
    pub fn updates(mut self, updates: impl Into<UpdateExpr>) -> Self {
        self.updates = Some(updates.into());
        self
    }

    #[must_use]
    pub fn options(mut self, options: FindOptions) -> Self {
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
        F: Fn(&mut FinderContext<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.before.add(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn register_after_hooks<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut FinderResultContext<'_, T>) -> HookResult + Send + Sync + 'static,
    {
        self.after.add(Arc::new(hook));
        self
    }

    pub fn reset_hooks(&mut self) {
        self.before.clear();
        self.after.clear();
    }

    /// First matching document, or `None`. The after phases only run when
    /// something was found.
    pub async fn find_one(mut self) -> ClientResult<Option<T>> {
        let name = self.target.name();
        let call_options = CallOptions::Find(self.options.clone());

        {
            let mut template = T::default();
            let mut ctx = OperationContext::new(name)
                .with_document(&mut template)
                .with_filter(&mut self.filter)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::before(self.target.registry(), &mut ctx, &FIND_BEFORE)?;
        }
        run_before(&self.before, name, &mut self.filter, None, &call_options, self.model_hook.as_ref())?;

        debug!(collection = name, "find_one");
        let Some(found) = self
            .target
            .store()
            .find_one(name, &self.filter, &self.options)
            .await?
        else {
            return Ok(None);
        };
        let mut doc: T = pipeline::from_document(found)?;

        {
            let mut ctx = OperationContext::new(name)
                .with_document(&mut doc)
                .with_filter(&mut self.filter)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::after(self.target.registry(), &mut ctx, &FIND_AFTER)?;
        }
        let mut ctx = FinderResultContext {
            collection: name,
            filter: &self.filter,
            updates: None,
            options: &call_options,
            model_hook: self.model_hook.as_ref(),
            docs: std::slice::from_mut(&mut doc),
        };
        pipeline::local_after(self.after.run(|hook| hook(&mut ctx)), &FIND_AFTER)?;
        Ok(Some(doc))
    }

    /// Every matching document, honouring sort, skip and limit.
    pub async fn find(mut self) -> ClientResult<Vec<T>> {
        let name = self.target.name();
        let call_options = CallOptions::Find(self.options.clone());

        {
            let mut ctx = OperationContext::new(name)
                .with_filter(&mut self.filter)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::before(self.target.registry(), &mut ctx, &FIND_BEFORE)?;
        }
        run_before(&self.before, name, &mut self.filter, None, &call_options, self.model_hook.as_ref())?;

        debug!(collection = name, "find");
        let found = self
            .target
            .store()
            .find(name, &self.filter, &self.options)
            .await?;
        let mut docs: Vec<T> = pipeline::from_documents(found)?;

        {
            let mut ctx = OperationContext::new(name)
                .with_payload(Payload::many(&mut docs))
                .with_filter(&mut self.filter)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::after(self.target.registry(), &mut ctx, &FIND_AFTER)?;
        }
        let mut ctx = FinderResultContext {
            collection: name,
            filter: &self.filter,
            updates: None,
            options: &call_options,
            model_hook: self.model_hook.as_ref(),
            docs: &mut docs,
        };
        pipeline::local_after(self.after.run(|hook| hook(&mut ctx)), &FIND_AFTER)?;
        Ok(docs)
    }

    /// Number of matching documents. Skip and limit apply; sort is ignored.
    pub async fn count(self) -> ClientResult<u64> {
        let options = CountOptions {
            limit: self.options.limit,
            skip: self.options.skip,
        };
        Ok(self
            .target
            .store()
            .count(self.target.name(), &self.filter, &options)
            .await?)
    }

    /// Distinct values of `field` across matching documents.
    pub async fn distinct(self, field: &str) -> ClientResult<Vec<Value>> {
        Ok(self
            .target
            .store()
            .distinct(self.target.name(), field, &self.filter)
            .await?)
    }

    pub async fn find_one_and_update(self) -> ClientResult<Option<T>> {
        self.find_one_and_update_with(FindOneAndUpdateOptions::default())
            .await
    }

    /// Atomically updates the first match and returns the version selected
    /// by `options.return_document`.
    pub async fn find_one_and_update_with(
        mut self,
        options: FindOneAndUpdateOptions,
    ) -> ClientResult<Option<T>> {
        let name = self.target.name();
        let call_options = CallOptions::FindOneAndUpdate(options.clone());
        let mut updates = self.updates.take().unwrap_or_default();

        {
            let mut template = T::default();
            let mut ctx = OperationContext::new(name)
                .with_document(&mut template)
                .with_filter(&mut self.filter)
                .with_updates(&mut updates)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::before(self.target.registry(), &mut ctx, &FIND_UPDATE_BEFORE)?;
        }
        run_before(
            &self.before,
            name,
            &mut self.filter,
            Some(&mut updates),
            &call_options,
            self.model_hook.as_ref(),
        )?;

        debug!(collection = name, "find_one_and_update");
        let Some(found) = self
            .target
            .store()
            .find_one_and_update(name, &self.filter, &updates, &options)
            .await?
        else {
            return Ok(None);
        };
        let mut doc: T = pipeline::from_document(found)?;

        {
            let mut ctx = OperationContext::new(name)
                .with_document(&mut doc)
                .with_filter(&mut self.filter)
                .with_updates(&mut updates)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::after(self.target.registry(), &mut ctx, &FIND_UPDATE_AFTER)?;
        }
        let mut ctx = FinderResultContext {
            collection: name,
            filter: &self.filter,
            updates: Some(&updates),
            options: &call_options,
            model_hook: self.model_hook.as_ref(),
            docs: std::slice::from_mut(&mut doc),
        };
        pipeline::local_after(self.after.run(|hook| hook(&mut ctx)), &FIND_UPDATE_AFTER)?;
        Ok(Some(doc))
    }
}

fn run_before(
    chain: &HookChain<FinderHookFn>,
    collection: &str,
    filter: &mut Filter,
    updates: Option<&mut UpdateExpr>,
    options: &CallOptions,
    model_hook: Option<&SharedModelHook>,
) -> HookResult {
    let mut ctx = FinderContext {
        collection,
        filter,
        updates,
        options,
        model_hook,
    };
    chain.run(|hook| hook(&mut ctx))
}

impl<T, S: ?Sized> fmt::Debug for Finder<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finder")
            .field("collection", &self.target.name())
            .field("filter", &self.filter)
            .field("updates", &self.updates)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
