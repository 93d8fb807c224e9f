//! Document verification state for tracked records.
//!
//! # Responsibility
//! - Define the three-state review status and its flag-aggregate rule.
//! - Describe which boolean flag maps to which audit-reference column.
//!
//! # Invariants
//! - `Reviewed` iff every flag is true, `NotReviewed` iff every flag is
//!   false, `Pending` otherwise.
//! - Status is always recomputed from the full flag set, never incrementally.

use crate::model::audit::AuditEntryId;
use serde::{Deserialize, Serialize};

/// Aggregate review status of a tracked record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// No document has been approved yet.
    #[default]
    NotReviewed,
    /// Some, but not all, documents are approved.
    Pending,
    /// Every document is approved.
    Reviewed,
}

impl VerificationStatus {
    /// Stable storage tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotReviewed => "not_reviewed",
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
        }
    }

    /// Label shown to program staff.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotReviewed => "No revisado",
            Self::Pending => "Pendiente",
            Self::Reviewed => "Revisado",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_reviewed" => Some(Self::NotReviewed),
            "pending" => Some(Self::Pending),
            "reviewed" => Some(Self::Reviewed),
            _ => None,
        }
    }
}

/// Derives the aggregate status from the complete flag set.
///
/// An empty flag set has nothing approved and derives `NotReviewed`.
pub fn derive_status(flags: &[bool]) -> VerificationStatus {
    if flags.is_empty() || flags.iter().all(|flag| !flag) {
        VerificationStatus::NotReviewed
    } else if flags.iter().all(|flag| *flag) {
        VerificationStatus::Reviewed
    } else {
        VerificationStatus::Pending
    }
}

/// Column pair for one verification flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    /// Boolean column holding the flag.
    pub flag: &'static str,
    /// Nullable column referencing the audit entry that last changed the flag.
    pub audit_ref: &'static str,
}

impl FlagSpec {
    pub const fn new(flag: &'static str, audit_ref: &'static str) -> Self {
        Self { flag, audit_ref }
    }
}

/// Snapshot of one tracked record's verification state.
///
/// `values` and `audit_refs` are ordered like `flags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationView {
    pub flags: &'static [FlagSpec],
    pub values: Vec<bool>,
    pub audit_refs: Vec<Option<AuditEntryId>>,
    pub status: VerificationStatus,
}

impl VerificationView {
    /// Whether the stored status agrees with the flag aggregate.
    pub fn is_consistent(&self) -> bool {
        self.status == derive_status(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_status, VerificationStatus};

    #[test]
    fn all_false_is_not_reviewed() {
        assert_eq!(
            derive_status(&[false, false, false]),
            VerificationStatus::NotReviewed
        );
    }

    #[test]
    fn all_true_is_reviewed() {
        assert_eq!(derive_status(&[true, true]), VerificationStatus::Reviewed);
    }

    #[test]
    fn any_mix_is_pending() {
        assert_eq!(
            derive_status(&[true, false, false]),
            VerificationStatus::Pending
        );
        assert_eq!(
            derive_status(&[true, true, false]),
            VerificationStatus::Pending
        );
    }

    #[test]
    fn empty_flag_set_is_not_reviewed() {
        assert_eq!(derive_status(&[]), VerificationStatus::NotReviewed);
    }

    #[test]
    fn storage_tags_parse_back() {
        for status in [
            VerificationStatus::NotReviewed,
            VerificationStatus::Pending,
            VerificationStatus::Reviewed,
        ] {
            assert_eq!(VerificationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VerificationStatus::Pending.label(), "Pendiente");
    }
}
