//! Lifecycle hooks declared by the model-hook target.
//!
//! A target opts into a phase by implementing that phase's single-method
//! trait and exposing it through the matching [`ModelHook`] probe, usually
//! via [`impl_model_hook!`](crate::impl_model_hook). Phases the target does
//! not implement are skipped without error.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{HookResult, OperationContext, OperationPhase};

pub trait BeforeInsert {
    fn before_insert(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait AfterInsert {
    fn after_insert(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait BeforeUpdate {
    fn before_update(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait AfterUpdate {
    fn after_update(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait BeforeDelete {
    fn before_delete(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait AfterDelete {
    fn after_delete(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait BeforeUpsert {
    fn before_upsert(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait AfterUpsert {
    fn after_upsert(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait BeforeFind {
    fn before_find(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

pub trait AfterFind {
    fn after_find(&mut self, ctx: &OperationContext<'_>) -> HookResult;
}

/// Capability probes for the ten lifecycle traits. Every probe defaults to
/// `None`.
pub trait ModelHook: Send {
    fn as_before_insert(&mut self) -> Option<&mut dyn BeforeInsert> {
        None
    }
    fn as_after_insert(&mut self) -> Option<&mut dyn AfterInsert> {
        None
    }
    fn as_before_update(&mut self) -> Option<&mut dyn BeforeUpdate> {
        None
    }
    fn as_after_update(&mut self) -> Option<&mut dyn AfterUpdate> {
        None
    }
    fn as_before_delete(&mut self) -> Option<&mut dyn BeforeDelete> {
        None
    }
    fn as_after_delete(&mut self) -> Option<&mut dyn AfterDelete> {
        None
    }
    fn as_before_upsert(&mut self) -> Option<&mut dyn BeforeUpsert> {
        None
    }
    fn as_after_upsert(&mut self) -> Option<&mut dyn AfterUpsert> {
        None
    }
    fn as_before_find(&mut self) -> Option<&mut dyn BeforeFind> {
        None
    }
    fn as_after_find(&mut self) -> Option<&mut dyn AfterFind> {
        None
    }
}

/// A model-hook target shared between the caller and the pipeline.
pub type SharedModelHook = Arc<Mutex<dyn ModelHook>>;

/// Wraps `hook` for attachment to a context or wrapper.
pub fn shared<H: ModelHook + 'static>(hook: H) -> SharedModelHook {
    Arc::new(Mutex::new(hook))
}

/// Implements [`ModelHook`] for a type, exposing the listed lifecycle
/// traits.
///
/// ```
/// use hookstore_hooks::model_hook::BeforeInsert;
/// use hookstore_hooks::{HookResult, OperationContext, impl_model_hook};
///
/// struct Audit(u32);
///
/// impl BeforeInsert for Audit {
///     fn before_insert(&mut self, _ctx: &OperationContext<'_>) -> HookResult {
///         self.0 += 1;
///         Ok(())
///     }
/// }
///
/// impl_model_hook!(Audit: BeforeInsert);
/// ```
#[macro_export]
macro_rules! impl_model_hook {
    (@probe BeforeInsert) => {
        fn as_before_insert(&mut self) -> Option<&mut dyn $crate::model_hook::BeforeInsert> {
            Some(self)
        }
    };
    (@probe AfterInsert) => {
        fn as_after_insert(&mut self) -> Option<&mut dyn $crate::model_hook::AfterInsert> {
            Some(self)
        }
    };
    (@probe BeforeUpdate) => {
        fn as_before_update(&mut self) -> Option<&mut dyn $crate::model_hook::BeforeUpdate> {
            Some(self)
        }
    };
    (@probe AfterUpdate) => {
        fn as_after_update(&mut self) -> Option<&mut dyn $crate::model_hook::AfterUpdate> {
            Some(self)
        }
    };
    (@probe BeforeDelete) => {
        fn as_before_delete(&mut self) -> Option<&mut dyn $crate::model_hook::BeforeDelete> {
            Some(self)
        }
    };
    (@probe AfterDelete) => {
        fn as_after_delete(&mut self) -> Option<&mut dyn $crate::model_hook::AfterDelete> {
            Some(self)
        }
    };
    (@probe BeforeUpsert) => {
        fn as_before_upsert(&mut self) -> Option<&mut dyn $crate::model_hook::BeforeUpsert> {
            Some(self)
        }
    };
    (@probe AfterUpsert) => {
        fn as_after_upsert(&mut self) -> Option<&mut dyn $crate::model_hook::AfterUpsert> {
            Some(self)
        }
    };
    (@probe BeforeFind) => {
        fn as_before_find(&mut self) -> Option<&mut dyn $crate::model_hook::BeforeFind> {
            Some(self)
        }
    };
    (@probe AfterFind) => {
        fn as_after_find(&mut self) -> Option<&mut dyn $crate::model_hook::AfterFind> {
            Some(self)
        }
    };
    ($ty:ty: $($cap:ident),+ $(,)?) => {
        impl $crate::model_hook::ModelHook for $ty {
            $( $crate::impl_model_hook!(@probe $cap); )+
        }
    };
    ($ty:ty) => {
        impl $crate::model_hook::ModelHook for $ty {}
    };
}

/// Invokes the lifecycle method `target` implements for `phase`, if any.
pub fn dispatch(
    target: &mut dyn ModelHook,
    ctx: &OperationContext<'_>,
    phase: OperationPhase,
) -> HookResult {
    use OperationPhase as P;

    match phase {
        P::BeforeInsert => target.as_before_insert().map_or(Ok(()), |h| h.before_insert(ctx)),
        P::AfterInsert => target.as_after_insert().map_or(Ok(()), |h| h.after_insert(ctx)),
        P::BeforeUpdate => target.as_before_update().map_or(Ok(()), |h| h.before_update(ctx)),
        P::AfterUpdate => target.as_after_update().map_or(Ok(()), |h| h.after_update(ctx)),
        P::BeforeDelete => target.as_before_delete().map_or(Ok(()), |h| h.before_delete(ctx)),
        P::AfterDelete => target.as_after_delete().map_or(Ok(()), |h| h.after_delete(ctx)),
        P::BeforeUpsert => target.as_before_upsert().map_or(Ok(()), |h| h.before_upsert(ctx)),
        P::AfterUpsert => target.as_after_upsert().map_or(Ok(()), |h| h.after_upsert(ctx)),
        P::BeforeFind => target.as_before_find().map_or(Ok(()), |h| h.before_find(ctx)),
        P::AfterFind => target.as_after_find().map_or(Ok(()), |h| h.after_find(ctx)),
    }
}

/// Registry entry point: dispatches to the context's model-hook target.
/// A context without a target is a no-op.
pub fn execute(ctx: &mut OperationContext<'_>, phase: OperationPhase) -> HookResult {
    let Some(target) = ctx.model_hook.clone() else {
        return Ok(());
    };
    let mut target = target.lock().unwrap_or_else(PoisonError::into_inner);
    dispatch(&mut *target, ctx, phase)
}
