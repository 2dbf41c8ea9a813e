//! Operation hook pipeline for hookstore.
//!
//! Every CRUD call builds an [`OperationContext`] and runs it through a
//! [`CallbackRegistry`] for the call's [`OperationPhase`]s, before and after
//! the remote operation. Callbacks observe and mutate the context; the first
//! error aborts the call.
//!
//! # Built-in plugins
//!
//! Three strategies ship as ordinary named callbacks, installed through
//! [`PluginConfig`]:
//!
//! - `hookstore:default_field` ([`field`]): id and timestamp injection
//! - `hookstore:model` ([`model_hook`]): lifecycle methods on the
//!   context's model-hook target
//! - `hookstore:validation` ([`validation`]): derived `#[validate]` constraints
//!
//! # Example
//!
//! ```
//! use hookstore_hooks::{CallbackRegistry, HookError, OperationContext, OperationPhase};
//! use hookstore_types::Filter;
//!
//! let registry = CallbackRegistry::new();
//! registry.register(OperationPhase::BeforeDelete, "no-mass-delete", |ctx, _| {
//!     match ctx.filter.as_deref() {
//!         Some(filter) if !filter.is_empty() => Ok(()),
//!         _ => Err(HookError::rejected("delete without filter")),
//!     }
//! });
//!
//! let mut filter = Filter::new();
//! let mut ctx = OperationContext::new("users").with_filter(&mut filter);
//! assert!(registry.execute(&mut ctx, &[OperationPhase::BeforeDelete]).is_err());
//! ```

mod context;
mod error;
pub mod field;
pub mod model_hook;
mod phase;
mod plugin;
mod registry;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use context::{OperationContext, Payload};
pub use error::{HookError, HookResult};
pub use model_hook::{ModelHook, SharedModelHook};
pub use phase::OperationPhase;
pub use plugin::{
    DEFAULT_FIELD_PHASES, DEFAULT_FIELD_PLUGIN, MODEL_HOOK_PLUGIN, PluginConfig, VALIDATION_PHASES,
    VALIDATION_PLUGIN, init_plugins, register_plugin, remove_plugin,
};
pub use registry::{Callback, CallbackRegistry, global};
pub use validation::Validation;
