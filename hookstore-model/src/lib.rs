//! Payload model for hookstore.
//!
//! Defines what a document payload can offer to the hook pipeline:
//! - [`Model`]: the object-safe payload trait with capability probes
//! - [`DefaultFields`] / [`CustomFields`]: the two field-default contracts
//!   (fixed field names vs. caller-chosen names)
//! - [`Validate`], [`StructValidator`]: derived `#[validate(...)]`
//!   constraints and the swappable validator that enforces them
//! - [`Base`]: an embeddable model carrying id and timestamps
//!
//! A payload type opts into a capability by overriding the matching probe
//! on [`Model`]. Probes that are not overridden report "not implemented",
//! and the pipeline silently skips that concern for the value.

mod base;
mod model;
mod validate;

pub use base::Base;
pub use model::{
    CREATED_AT_FIELD, CustomFields, DefaultFields, ID_FIELD, Model, NamedValue, UPDATED_AT_FIELD,
};
pub use validate::{FieldError, StructValidator, TagValidator, Validate, ValidationErrors};
