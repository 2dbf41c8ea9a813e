use hookstore_types::{ObjectId, Timestamp};
use serde_json::Value;

use crate::Validate;

/// Serialized name of the identifier under the fixed-name contract.
pub const ID_FIELD: &str = "_id";
/// Serialized name of the creation time under the fixed-name contract.
pub const CREATED_AT_FIELD: &str = "created_at";
/// Serialized name of the modification time under the fixed-name contract.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// A field name paired with its JSON value.
pub type NamedValue = (String, Value);

/// A document payload that can flow through the hook pipeline.
///
/// Every probe defaults to `None`. Override the ones the type supports:
///
/// ```
/// use hookstore_model::{DefaultFields, Model};
/// use hookstore_types::{ObjectId, Timestamp, timestamp};
///
/// #[derive(Default)]
/// struct Note {
///     id: ObjectId,
///     created_at: Option<Timestamp>,
///     updated_at: Option<Timestamp>,
/// }
///
/// impl DefaultFields for Note {
///     fn default_id(&mut self) -> ObjectId {
///         if self.id.is_nil() {
///             self.id = ObjectId::new();
///         }
///         self.id
///     }
///     fn default_created_at(&mut self) -> Timestamp {
///         *self.created_at.get_or_insert_with(timestamp::now)
///     }
///     fn default_updated_at(&mut self) -> Timestamp {
///         *self.updated_at.insert(timestamp::now())
///     }
/// }
///
/// impl Model for Note {
///     fn as_default_fields(&mut self) -> Option<&mut dyn DefaultFields> {
///         Some(self)
///     }
/// }
/// ```
pub trait Model: Send + Sync {
    /// Fixed-name field defaulting (`_id`, `created_at`, `updated_at`).
    fn as_default_fields(&mut self) -> Option<&mut dyn DefaultFields> {
        None
    }

    /// Caller-named field defaulting.
    fn as_custom_fields(&mut self) -> Option<&mut dyn CustomFields> {
        None
    }

    /// Derived `#[validate(...)]` constraints.
    fn as_validate(&self) -> Option<&dyn Validate> {
        None
    }

    /// Set for calendar timestamps, which are never validated as structs.
    fn as_timestamp(&self) -> Option<&Timestamp> {
        None
    }
}

/// Fixed-name field defaulting.
///
/// `default_id` and `default_created_at` initialise their field only while
/// it is unset and return the (possibly pre-existing) value;
/// `default_updated_at` regenerates its field on every call.
pub trait DefaultFields {
    fn default_id(&mut self) -> ObjectId;
    fn default_created_at(&mut self) -> Timestamp;
    fn default_updated_at(&mut self) -> Timestamp;
}

/// Caller-named field defaulting.
///
/// Same initialisation rules as [`DefaultFields`], but each method also
/// returns the serialized field name the value must be written under.
pub trait CustomFields {
    fn custom_id(&mut self) -> NamedValue;
    fn custom_created_at(&mut self) -> NamedValue;
    fn custom_updated_at(&mut self) -> NamedValue;
}

impl Model for Timestamp {
    fn as_timestamp(&self) -> Option<&Timestamp> {
        Some(self)
    }
}
