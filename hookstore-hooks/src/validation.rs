//! Validation strategy.
//!
//! Insert validates the document payload, upsert the replacement; every
//! other phase is a no-op. Timestamp payloads are never validated. In a
//! list the first invalid element aborts and later elements are not
//! checked.

use hookstore_model::{Model, TagValidator, StructValidator};
use std::fmt;
use std::sync::Arc;

use crate::{HookError, HookResult, OperationContext, OperationPhase};

/// The validation plugin, bound to one [`StructValidator`].
#[derive(Clone)]
pub struct Validation {
    validator: Arc<dyn StructValidator>,
}

impl Validation {
    pub fn new(validator: Arc<dyn StructValidator>) -> Self {
        Self { validator }
    }

    /// Registry entry point.
    pub fn execute(&self, ctx: &mut OperationContext<'_>, phase: OperationPhase) -> HookResult {
        match phase {
            OperationPhase::BeforeInsert => match ctx.document.as_mut() {
                Some(payload) => payload.try_for_each(|doc| self.check(doc)),
                None => Ok(()),
            },
            OperationPhase::BeforeUpsert => match ctx.replacement.as_deref() {
                Some(doc) => self.check(doc),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn check(&self, doc: &dyn Model) -> HookResult {
        if doc.as_timestamp().is_some() {
            return Ok(());
        }
        self.validator.validate(doc).map_err(HookError::Validation)
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new(Arc::new(TagValidator))
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation").finish_non_exhaustive()
    }
}
