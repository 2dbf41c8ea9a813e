//! Typed CRUD wrappers for hookstore.
//!
//! A [`Collection`] binds a model type to a [`DocumentStore`] and a
//! [`CallbackRegistry`](hookstore_hooks::CallbackRegistry). Its wrappers
//! ([`Creator`], [`Finder`], [`Updater`], [`Deleter`], [`Aggregator`]) run
//! every call through the same sequence:
//!
//! 1. global before-phase callbacks
//! 2. the wrapper's local before hooks
//! 3. the store call
//! 4. global after-phase callbacks
//! 5. the wrapper's local after hooks
//!
//! A failure in steps 1-2 aborts before anything is sent and surfaces as
//! [`ClientError::Hook`]. A failure in steps 4-5 surfaces as
//! [`ClientError::AfterCommit`]: the store already applied the operation.
//!
//! [`MemoryStore`] is an in-process store for tests and demos.

mod aggregator;
mod chain;
mod collection;
mod creator;
mod deleter;
mod error;
mod eval;
mod finder;
mod memory;
mod pipeline;
mod store;
mod updater;

pub use aggregator::Aggregator;
pub use collection::Collection;
pub use creator::{Creator, CreatorContext, CreatorHookFn};
pub use deleter::{Deleter, DeleterContext, DeleterHookFn};
pub use error::{ClientError, ClientResult, StoreError, StoreResult};
pub use finder::{Finder, FinderContext, FinderHookFn, FinderResultContext, FinderResultHookFn};
pub use memory::MemoryStore;
pub use store::DocumentStore;
pub use updater::{Updater, UpdaterContext, UpdaterHookFn};
