//! The `_id` value of stored documents.
//!
//! Ids are UUID v7, so documents inserted later sort after earlier ones when
//! a store orders by `_id`. On the wire an id is its hyphenated string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// Unique identifier of a stored document.
///
/// The default value is the nil id, which plays the role of "unset":
/// field defaulting only generates an id while the current one is nil.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generates a fresh id for a document about to be inserted.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The unset id carried by models that were never stored.
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// True until field defaulting or the caller assigns an id.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Reads an id back from a stored `_id` string.
    pub fn parse(input: &str) -> crate::Result<Self> {
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|source| Error::InvalidObjectId {
                input: input.to_string(),
                source,
            })
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ObjectId> for serde_json::Value {
    fn from(id: ObjectId) -> Self {
        serde_json::Value::String(id.to_string())
    }
}
