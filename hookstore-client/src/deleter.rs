//! Delete wrapper.

use hookstore_hooks::{HookResult, OperationContext, OperationPhase, SharedModelHook};
use hookstore_types::{CallOptions, DeleteOptions, DeleteResult, Filter};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

use crate::chain::HookChain;
use crate::collection::Target;
use crate::{ClientResult, DocumentStore, pipeline};

const BEFORE: [OperationPhase; 1] = [OperationPhase::BeforeDelete];
const AFTER: [OperationPhase; 1] = [OperationPhase::AfterDelete];

/// What a local delete hook sees. There is no document payload.
pub struct DeleterContext<'a> {
    pub collection: &'a str,
    pub filter: &'a mut Filter,
    pub options: &'a CallOptions,
    pub model_hook: Option<&'a SharedModelHook>,
    /// Set for after hooks only.
    pub result: Option<&'a DeleteResult>,
}

pub type DeleterHookFn = dyn Fn(&mut DeleterContext<'_>) -> HookResult + Send + Sync;

/// Removes `T` documents from one collection.
pub struct Deleter<T, S: ?Sized> {
    target: Target<S>,
    filter: Filter,
    options: DeleteOptions,
    model_hook: Option<SharedModelHook>,
    before: HookChain<DeleterHookFn>,
    after: HookChain<DeleterHookFn>,
    _model: PhantomData<fn() -> T>,
}

impl<T, S: DocumentStore + ?Sized> Deleter<T, S> {
    pub(crate) fn new(target: Target<S>) -> Self {
        Self {
            target,
            filter: Filter::new(),
            options: DeleteOptions::default(),
            model_hook: None,
            before: HookChain::new(),
            after: HookChain::new(),
            _model: PhantomData,
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn options(mut self, options: DeleteOptions) -> Self {
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
        F: Fn(&mut DeleterContext<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.before.add(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn register_after_hooks<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut DeleterContext<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.after.add(Arc::new(hook));
        self
    }

    pub fn reset_hooks(&mut self) {
        self.before.clear();
        self.after.clear();
    }

    pub async fn delete_one(self) -> ClientResult<DeleteResult> {
        self.execute(false).await
    }

    pub async fn delete_many(self) -> ClientResult<DeleteResult> {
        self.execute(true).await
    }

    async fn execute(mut self, many: bool) -> ClientResult<DeleteResult> {
        let name = self.target.name();
        let call_options = CallOptions::Delete(self.options.clone());

        {
            let mut ctx = OperationContext::new(name)
                .with_filter(&mut self.filter)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::before(self.target.registry(), &mut ctx, &BEFORE)?;
        }
        {
            let mut ctx = DeleterContext {
                collection: name,
                filter: &mut self.filter,
                options: &call_options,
                model_hook: self.model_hook.as_ref(),
                result: None,
            };
            self.before.run(|hook| hook(&mut ctx))?;
        }

        debug!(collection = name, many, "delete");
        let store = self.target.store();
        let result = if many {
            store.delete_many(name, &self.filter, &self.options).await?
        } else {
            store.delete_one(name, &self.filter, &self.options).await?
        };

        {
            let mut ctx = OperationContext::new(name)
                .with_filter(&mut self.filter)
                .with_options(&call_options)
                .with_model_hook(self.model_hook.clone());
            pipeline::after(self.target.registry(), &mut ctx, &AFTER)?;
        }
        let mut ctx = DeleterContext {
            collection: name,
            filter: &mut self.filter,
            options: &call_options,
            model_hook: self.model_hook.as_ref(),
            result: Some(&result),
        };
        pipeline::local_after(self.after.run(|hook| hook(&mut ctx)), &AFTER)?;
        Ok(result)
    }
}

impl<T, S: ?Sized> fmt::Debug for Deleter<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deleter")
            .field("collection", &self.target.name())
            .field("filter", &self.filter)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
