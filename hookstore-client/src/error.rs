//! Error types for the client layer.

use hookstore_hooks::{HookError, OperationPhase};
use hookstore_model::ValidationErrors;
use thiserror::Error;
use tracing::warn;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a [`DocumentStore`](crate::DocumentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document with the same `_id` already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The filter uses an operator the store does not understand.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The update cannot be applied to the matched document.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// Aggregation stage not supported by the store.
    #[error("unsupported aggregation stage: {0}")]
    UnsupportedStage(String),

    /// Transport failure talking to a remote store.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A batch insert failed after committing some of its documents.
    #[error("{} documents inserted before failure: {source}", .inserted_ids.len())]
    PartialInsert {
        inserted_ids: Vec<serde_json::Value>,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// Ids a failed batch insert still committed.
    pub fn inserted_ids(&self) -> &[serde_json::Value] {
        match self {
            Self::PartialInsert { inserted_ids, .. } => inserted_ids,
            _ => &[],
        }
    }

    pub(crate) fn partial(inserted_ids: Vec<serde_json::Value>, source: StoreError) -> Self {
        if inserted_ids.is_empty() {
            source
        } else {
            Self::PartialInsert {
                inserted_ids,
                source: Box::new(source),
            }
        }
    }
}

/// Result type for CRUD wrapper calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by the CRUD wrappers.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A before-phase callback or local hook aborted the call. Nothing was
    /// sent to the store.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The store applied the operation, then an after-phase callback or
    /// local hook failed.
    #[error("{phase} hook failed after the operation committed: {source}")]
    AfterCommit {
        phase: OperationPhase,
        #[source]
        source: HookError,
    },

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A payload could not be converted to or from a document.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn after_commit(phase: OperationPhase, source: HookError) -> Self {
        warn!(phase = %phase, error = %source, "after hook failed on committed operation");
        Self::AfterCommit { phase, source }
    }

    /// The validation failure behind this error, in either direction.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Hook(err) | Self::AfterCommit { source: err, .. } => err.as_validation(),
            _ => None,
        }
    }

    /// Returns `true` when the store already applied the operation.
    pub fn is_after_commit(&self) -> bool {
        matches!(self, Self::AfterCommit { .. })
    }
}
