//! Struct validation.
//!
//! Models declare their constraints as `#[validate(...)]` attributes and
//! derive [`Validate`] from the `validator` crate. The [`StructValidator`]
//! trait is the override point the hook pipeline calls; [`TagValidator`] is
//! the stock implementation that runs the derived checks.
//!
//! ```
//! use hookstore_model::{Model, StructValidator, TagValidator, Validate};
//!
//! #[derive(Validate)]
//! struct Account {
//!     #[validate(length(min = 1))]
//!     owner: String,
//!     #[validate(range(min = 0))]
//!     balance: i64,
//! }
//!
//! impl Model for Account {
//!     fn as_validate(&self) -> Option<&dyn Validate> {
//!         Some(self)
//!     }
//! }
//!
//! let errors = TagValidator
//!     .validate(&Account { owner: String::new(), balance: -5 })
//!     .unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use validator::ValidationErrorsKind;

pub use validator::Validate;

use crate::Model;

/// One failed constraint on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("field '{field}' failed '{code}' (got {value})")]
pub struct FieldError {
    /// Dotted path of the field, with list indices for nested lists.
    pub field: String,
    /// Constraint name, e.g. `length` or `range`.
    pub code: String,
    /// The offending value, or null when the constraint does not report one.
    pub value: Value,
}

/// Every constraint violation found on one value, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Error)]
#[serde(transparent)]
#[error("validation failed: {}", join(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Violations recorded for `field`.
    pub fn field(&self, field: &str) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = Vec::new();
        flatten("", &source, &mut errors);
        errors.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
        Self { errors }
    }
}

fn flatten(prefix: &str, source: &validator::ValidationErrors, out: &mut Vec<FieldError>) {
    for (name, kind) in source.errors() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(failures) => {
                out.extend(failures.iter().map(|failure| FieldError {
                    field: path.clone(),
                    code: failure.code.to_string(),
                    value: failure.params.get("value").cloned().unwrap_or(Value::Null),
                }));
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{path}.{index}"), inner, out);
                }
            }
        }
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The validator the hook pipeline calls for insert and upsert payloads.
///
/// Implementations must treat models that declare no constraints as valid.
pub trait StructValidator: Send + Sync {
    fn validate(&self, model: &dyn Model) -> Result<(), ValidationErrors>;
}

/// Runs the `#[validate(...)]` constraints a model derives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagValidator;

impl StructValidator for TagValidator {
    fn validate(&self, model: &dyn Model) -> Result<(), ValidationErrors> {
        match model.as_validate() {
            Some(checks) => checks.validate().map_err(ValidationErrors::from),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1))]
        qty: i64,
    }

    #[derive(Validate)]
    struct Order {
        #[validate(length(min = 1, max = 4))]
        code: String,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn nested_list_errors_get_indexed_paths() {
        let order = Order {
            code: "x".into(),
            lines: vec![Line { qty: 2 }, Line { qty: 0 }],
        };
        let errors = ValidationErrors::from(order.validate().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "lines.1.qty");
        assert_eq!(errors.errors()[0].code, "range");
        assert_eq!(errors.errors()[0].value, json!(0));
    }

    #[test]
    fn errors_are_ordered_by_field() {
        let order = Order {
            code: "toolong".into(),
            lines: vec![Line { qty: -1 }],
        };
        let errors = ValidationErrors::from(order.validate().unwrap_err());
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["code", "lines.0.qty"]);
    }

    #[test]
    fn empty_errors_are_ok() {
        assert_eq!(ValidationErrors::new().into_result(), Ok(()));
    }
}
