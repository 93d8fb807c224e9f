//! Audit log records.
//!
//! # Invariants
//! - Entries are immutable once appended.
//! - `recorded_at` is epoch milliseconds; ties are broken by `id`.

use crate::model::entity::{EntityType, RecordId, UserId};
use serde::{Deserialize, Serialize};

/// Monotonic audit log row id.
pub type AuditEntryId = i64;

/// Kind of mutation recorded by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// One column transition captured by an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: serde_json::Value,
    pub new: serde_json::Value,
}

/// Persisted audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub entity_type: EntityType,
    pub entity_id: RecordId,
    /// `None` for writes performed without an authenticated actor.
    pub actor_id: Option<UserId>,
    pub action: AuditAction,
    pub recorded_at: i64,
    pub changes: Vec<FieldChange>,
}

impl AuditEntry {
    /// Whether this entry touched `field`.
    pub fn touches(&self, field: &str) -> bool {
        self.changes.iter().any(|change| change.field == field)
    }
}

/// Entry about to be appended; id and timestamp are assigned on write.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub entity_type: EntityType,
    pub entity_id: RecordId,
    pub actor_id: Option<UserId>,
    pub action: AuditAction,
    pub changes: Vec<FieldChange>,
}
