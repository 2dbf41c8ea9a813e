//! Results returned by the remote store for write verbs.
//!
//! Ids are raw JSON values: models using caller-named fields may store any
//! scalar under `_id`, not only an [`ObjectId`](crate::ObjectId).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOneResult {
    pub inserted_id: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertManyResult {
    /// Ids in payload order.
    pub inserted_ids: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    /// Set when an upsert inserted a new document.
    pub upserted_id: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted_count: u64,
}
