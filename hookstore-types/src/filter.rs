//! Query filters.
//!
//! A [`Filter`] is a document mapping field names to either a literal value
//! (equality) or an operator object such as `{"$gt": 3}`. Conditions added
//! for a key that already holds an operator object are merged into it, so
//! `gte("age", 18).lt("age", 65)` yields `{"age": {"$gte": 18, "$lt": 65}}`.

use crate::{Document, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A query filter document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Document);

impl Filter {
    /// Creates an empty filter (matches every document).
    #[must_use]
    pub fn new() -> Self {
        Self(Document::new())
    }

    /// Filter on the `_id` field.
    #[must_use]
    pub fn by_id(id: ObjectId) -> Self {
        Self::new().eq("_id", id)
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.and_field(field, value.into())
    }

    #[must_use]
    pub fn ne(self, field: &str, value: impl Into<Value>) -> Self {
        self.and_field(field, json!({ "$ne": value.into() }))
    }

    #[must_use]
    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.and_field(field, json!({ "$gt": value.into() }))
    }

    #[must_use]
    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.and_field(field, json!({ "$gte": value.into() }))
    }

    #[must_use]
    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.and_field(field, json!({ "$lt": value.into() }))
    }

    #[must_use]
    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.and_field(field, json!({ "$lte": value.into() }))
    }

    /// Matches when the field equals any of `values`.
    #[must_use]
    pub fn is_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.and_field(field, json!({ "$in": values }))
    }

    /// Matches on presence (or absence) of the field.
    #[must_use]
    pub fn exists(self, field: &str, present: bool) -> Self {
        self.and_field(field, json!({ "$exists": present }))
    }

    /// Adds a raw condition for `field`, applying the merge-by-key rule.
    #[must_use]
    pub fn and_field(mut self, field: &str, condition: Value) -> Self {
        self.insert(field, condition);
        self
    }

    /// In-place variant of [`Filter::and_field`], for hooks that narrow a
    /// query they were handed.
    pub fn insert(&mut self, field: &str, condition: Value) {
        match (self.0.get_mut(field), condition) {
            (Some(Value::Object(existing)), Value::Object(incoming))
                if is_operator_object(existing) && is_operator_object(&incoming) =>
            {
                for (op, value) in incoming {
                    existing.insert(op, value);
                }
            }
            (_, condition) => {
                self.0.insert(field.to_string(), condition);
            }
        }
    }

    /// Returns the condition registered for `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Document> for Filter {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

fn is_operator_object(map: &Document) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}
