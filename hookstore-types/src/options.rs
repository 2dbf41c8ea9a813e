//! Verb-specific call options.
//!
//! The hook pipeline treats these as opaque: they travel in the operation
//! context as a [`CallOptions`] so callbacks can inspect them, and are
//! handed to the remote store unchanged.

use serde::{Deserialize, Serialize};

/// Sort direction for a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Which version of the document `find_one_and_update` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnDocument {
    #[default]
    Before,
    After,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertOneOptions {
    /// Skip server-side document validation.
    #[serde(default)]
    pub bypass_validation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertManyOptions {
    /// Stop at the first failed insert.
    #[serde(default = "default_ordered")]
    pub ordered: bool,
}

fn default_ordered() -> bool {
    true
}

impl Default for InsertManyOptions {
    fn default() -> Self {
        Self { ordered: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<(String, SortOrder)>,
}

impl FindOptions {
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort.push((field.to_string(), order));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Insert a new document when nothing matches the filter.
    #[serde(default)]
    pub upsert: bool,
}

impl UpdateOptions {
    #[must_use]
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOneAndUpdateOptions {
    #[serde(default)]
    pub upsert: bool,
    #[serde(default)]
    pub return_document: ReturnDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

/// The options of whichever verb is being executed.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOptions {
    InsertOne(InsertOneOptions),
    InsertMany(InsertManyOptions),
    Find(FindOptions),
    Update(UpdateOptions),
    Delete(DeleteOptions),
    FindOneAndUpdate(FindOneAndUpdateOptions),
}

impl CallOptions {
    /// True when the call will insert on a filter miss.
    pub fn is_upsert(&self) -> bool {
        match self {
            Self::Update(opts) => opts.upsert,
            Self::FindOneAndUpdate(opts) => opts.upsert,
            _ => false,
        }
    }
}
