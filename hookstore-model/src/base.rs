use hookstore_types::{ObjectId, Timestamp, timestamp};
use serde::{Deserialize, Serialize};

use crate::{DefaultFields, Model};

/// Identifier and bookkeeping timestamps shared by most stored models.
///
/// Embed it with `#[serde(flatten)]` and forward
/// [`Model::as_default_fields`] to it:
///
/// ```
/// use hookstore_model::{Base, DefaultFields, Model};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Post {
///     #[serde(flatten)]
///     base: Base,
///     title: String,
/// }
///
/// impl Model for Post {
///     fn as_default_fields(&mut self) -> Option<&mut dyn DefaultFields> {
///         Some(&mut self.base)
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Base {
    #[serde(rename = "_id", default, skip_serializing_if = "ObjectId::is_nil")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
}

impl DefaultFields for Base {
    fn default_id(&mut self) -> ObjectId {
        if self.id.is_nil() {
            self.id = ObjectId::new();
        }
        self.id
    }

    fn default_created_at(&mut self) -> Timestamp {
        *self.created_at.get_or_insert_with(timestamp::now)
    }

    fn default_updated_at(&mut self) -> Timestamp {
        *self.updated_at.insert(timestamp::now())
    }
}

impl Model for Base {
    fn as_default_fields(&mut self) -> Option<&mut dyn DefaultFields> {
        Some(self)
    }
}
