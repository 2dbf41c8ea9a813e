//! Update expressions.
//!
//! [`Update`] is an explicit operator → field → value tree. Hooks that need
//! to inject fields (for example a modification timestamp into `$set`) reach
//! the relevant section through [`Update::section_mut`] instead of probing
//! an untyped map.

use crate::{Document, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Update operators understood by the structured update expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UpdateOperator {
    #[serde(rename = "$set")]
    Set,
    #[serde(rename = "$setOnInsert")]
    SetOnInsert,
    #[serde(rename = "$unset")]
    Unset,
    #[serde(rename = "$inc")]
    Inc,
    #[serde(rename = "$push")]
    Push,
}

impl UpdateOperator {
    pub const ALL: [UpdateOperator; 5] = [
        Self::Set,
        Self::SetOnInsert,
        Self::Unset,
        Self::Inc,
        Self::Push,
    ];

    /// Returns the wire name of the operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "$set",
            Self::SetOnInsert => "$setOnInsert",
            Self::Unset => "$unset",
            Self::Inc => "$inc",
            Self::Push => "$push",
        }
    }
}

impl FromStr for UpdateOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for UpdateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured update: one field document per operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    sections: BTreeMap<UpdateOperator, Document>,
}

impl Update {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.put(UpdateOperator::Set, field, value.into());
        self
    }

    #[must_use]
    pub fn set_on_insert(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.put(UpdateOperator::SetOnInsert, field, value.into());
        self
    }

    #[must_use]
    pub fn unset(mut self, field: &str) -> Self {
        self.put(UpdateOperator::Unset, field, Value::String(String::new()));
        self
    }

    #[must_use]
    pub fn inc(mut self, field: &str, by: impl Into<Value>) -> Self {
        self.put(UpdateOperator::Inc, field, by.into());
        self
    }

    #[must_use]
    pub fn push(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.put(UpdateOperator::Push, field, value.into());
        self
    }

    /// Writes `field` under `op`, replacing any earlier value for that field.
    pub fn put(&mut self, op: UpdateOperator, field: &str, value: Value) {
        self.section_mut(op).insert(field.to_string(), value);
    }

    /// Returns the field document for `op`, if present.
    pub fn section(&self, op: UpdateOperator) -> Option<&Document> {
        self.sections.get(&op)
    }

    /// Returns the field document for `op`, creating an empty one if absent.
    pub fn section_mut(&mut self, op: UpdateOperator) -> &mut Document {
        self.sections.entry(op).or_default()
    }

    /// Iterates the non-empty sections in operator order.
    pub fn sections(&self) -> impl Iterator<Item = (UpdateOperator, &Document)> {
        self.sections
            .iter()
            .filter(|(_, fields)| !fields.is_empty())
            .map(|(op, fields)| (*op, fields))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(Document::is_empty)
    }

    /// Renders the update as a wire document, e.g. `{"$set": {...}}`.
    /// Empty sections are omitted.
    pub fn to_document(&self) -> Document {
        self.sections()
            .map(|(op, fields)| (op.as_str().to_string(), Value::Object(fields.clone())))
            .collect()
    }

    /// Parses a wire document whose top-level keys are all known operators.
    pub fn from_document(doc: &Document) -> crate::Result<Self> {
        let mut update = Self::new();
        for (key, value) in doc {
            let op: UpdateOperator = key.parse()?;
            let section = update.section_mut(op);
            if let Value::Object(fields) = value {
                section.extend(fields.clone());
            }
        }
        Ok(update)
    }
}

impl Serialize for Update {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Update {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = Document::deserialize(deserializer)?;
        Self::from_document(&doc).map_err(serde::de::Error::custom)
    }
}

/// The update expression attached to an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateExpr {
    /// A structured operator update; hooks can address its sections.
    Operators(Update),
    /// An aggregation-pipeline update, passed through unexamined.
    Pipeline(Vec<Document>),
}

impl UpdateExpr {
    /// Returns the structured update, if this expression is one.
    pub fn as_operators_mut(&mut self) -> Option<&mut Update> {
        match self {
            Self::Operators(update) => Some(update),
            Self::Pipeline(_) => None,
        }
    }

    pub fn as_operators(&self) -> Option<&Update> {
        match self {
            Self::Operators(update) => Some(update),
            Self::Pipeline(_) => None,
        }
    }
}

impl Default for UpdateExpr {
    fn default() -> Self {
        Self::Operators(Update::new())
    }
}

impl From<Update> for UpdateExpr {
    fn from(update: Update) -> Self {
        Self::Operators(update)
    }
}

impl From<Vec<Document>> for UpdateExpr {
    fn from(pipeline: Vec<Document>) -> Self {
        Self::Pipeline(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_sections_are_not_rendered() {
        let mut update = Update::new();
        update.section_mut(UpdateOperator::SetOnInsert);
        assert!(update.is_empty());
        assert!(update.to_document().is_empty());
    }

    #[test]
    fn later_write_replaces_field() {
        let update = Update::new().set("name", "a").set("name", "b");
        assert_eq!(
            Value::Object(update.to_document()),
            json!({"$set": {"name": "b"}})
        );
    }
}
