//! Error types for the hook pipeline.

use hookstore_model::ValidationErrors;
use thiserror::Error;

/// Errors raised by callbacks, local hooks and model hooks.
///
/// The pipeline never wraps these: whatever a callback returns reaches the
/// caller unchanged, so a validation failure can always be matched as
/// [`HookError::Validation`].
#[derive(Debug, Error)]
pub enum HookError {
    /// Payload failed its declared constraints.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A hook vetoed the operation.
    #[error("operation rejected: {reason}")]
    Rejected { reason: String },

    /// A field value could not be serialized for injection.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unknown phase name.
    #[error("unknown operation phase: {0}")]
    UnknownPhase(String),

    /// Any other failure raised by user code.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl HookError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }

    /// Returns the validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type returned by every hook.
pub type HookResult<T = ()> = Result<T, HookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rejected() {
        let err = HookError::rejected("read only");
        assert_eq!(err.to_string(), "operation rejected: read only");
    }

    #[test]
    fn display_other_is_transparent() {
        let err = HookError::other("quota exceeded");
        assert_eq!(err.to_string(), "quota exceeded");
        assert!(err.as_validation().is_none());
    }

    #[test]
    fn validation_is_recoverable_by_type() {
        let err = HookError::from(ValidationErrors::new());
        assert!(err.as_validation().is_some());
    }
}
