//! Core value types for hookstore.
//!
//! This crate defines the plain data exchanged between the CRUD wrappers,
//! the hook pipeline and the remote document store:
//! - [`ObjectId`] document identifiers (UUID v7)
//! - [`Timestamp`] local wall-clock times
//! - [`Filter`] query documents with merge-by-key semantics
//! - [`Update`] / [`UpdateExpr`] operator → field → value update expressions
//! - verb-specific call options and results
//!
//! Nothing here knows about hooks; the pipeline only reads these values.

mod filter;
mod ids;
mod options;
mod results;
pub mod timestamp;
mod update;

pub use filter::Filter;
pub use ids::ObjectId;
pub use options::{
    AggregateOptions, CallOptions, CountOptions, DeleteOptions, FindOneAndUpdateOptions,
    FindOptions, InsertManyOptions, InsertOneOptions, ReturnDocument, SortOrder, UpdateOptions,
};
pub use results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult};
pub use timestamp::Timestamp;
pub use update::{Update, UpdateExpr, UpdateOperator};

/// An ordered JSON object, the wire shape of every stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid object id '{input}': {source}")]
    InvalidObjectId {
        input: String,
        #[source]
        source: uuid::Error,
    },

    #[error("unknown update operator: {0}")]
    UnknownOperator(String),
}
