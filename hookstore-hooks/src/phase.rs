//! Operation phases.
//!
//! A phase pairs a verb family (insert, update, delete, upsert, find) with
//! a direction. It is the only key the callback registry dispatches on.

use crate::HookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every point where the pipeline runs callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationPhase {
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
    BeforeUpsert,
    AfterUpsert,
    BeforeFind,
    AfterFind,
}

impl OperationPhase {
    pub const ALL: [OperationPhase; 10] = [
        Self::BeforeInsert,
        Self::AfterInsert,
        Self::BeforeUpdate,
        Self::AfterUpdate,
        Self::BeforeDelete,
        Self::AfterDelete,
        Self::BeforeUpsert,
        Self::AfterUpsert,
        Self::BeforeFind,
        Self::AfterFind,
    ];

    /// Returns `true` for phases that run before the remote call and may
    /// veto it.
    #[must_use]
    pub fn is_before(&self) -> bool {
        matches!(
            self,
            Self::BeforeInsert
                | Self::BeforeUpdate
                | Self::BeforeDelete
                | Self::BeforeUpsert
                | Self::BeforeFind
        )
    }

    /// Returns `true` for phases that run after the remote call committed.
    #[must_use]
    pub fn is_after(&self) -> bool {
        !self.is_before()
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeInsert => "beforeInsert",
            Self::AfterInsert => "afterInsert",
            Self::BeforeUpdate => "beforeUpdate",
            Self::AfterUpdate => "afterUpdate",
            Self::BeforeDelete => "beforeDelete",
            Self::AfterDelete => "afterDelete",
            Self::BeforeUpsert => "beforeUpsert",
            Self::AfterUpsert => "afterUpsert",
            Self::BeforeFind => "beforeFind",
            Self::AfterFind => "afterFind",
        }
    }
}

impl FromStr for OperationPhase {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| HookError::UnknownPhase(s.to_string()))
    }
}

impl fmt::Display for OperationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_before_five_after() {
        assert_eq!(OperationPhase::ALL.iter().filter(|p| p.is_before()).count(), 5);
        assert_eq!(OperationPhase::ALL.iter().filter(|p| p.is_after()).count(), 5);
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&OperationPhase::BeforeUpsert).unwrap();
        assert_eq!(json, "\"beforeUpsert\"");
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "beforeSave".parse::<OperationPhase>().unwrap_err();
        assert_eq!(err.to_string(), "unknown operation phase: beforeSave");
    }
}
