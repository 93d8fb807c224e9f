//! Verification reconciler for tracked records.
//!
//! # Responsibility
//! - Keep `status` equal to the aggregate of the verification flags.
//! - Point each changed flag's audit reference at the audit entry that
//!   recorded the change.
//!
//! # Invariants
//! - One routine serves every tracked record type; the flag list is data.
//! - Only `status` and the changed reference columns are written, never
//!   the whole row.
//! - The reconciler never appends audit entries of its own.
//! - A failed or empty audit lookup leaves references untouched.

use crate::model::audit::AuditEntryId;
use crate::model::entity::EntityRef;
use crate::model::verification::{derive_status, FlagSpec, VerificationStatus, VerificationView};
use crate::repo::audit_repo::AuditLog;
use crate::repo::RepoError;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Single-column writes the reconciler performs on a tracked row.
pub trait VerificationStore {
    /// Persists the `status` column alone.
    fn write_status(&self, target: EntityRef, status: VerificationStatus) -> Result<(), RepoError>;
    /// Persists the given audit-reference columns in one write.
    fn write_audit_refs(
        &self,
        target: EntityRef,
        refs: &[(&'static str, AuditEntryId)],
    ) -> Result<(), RepoError>;
}

/// One reconciliation request, taken right after the primary save.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub target: EntityRef,
    pub flags: &'static [FlagSpec],
    /// Status currently persisted on the row.
    pub stored_status: VerificationStatus,
    /// Flag values before the save, ordered like `flags`.
    pub before: &'a [bool],
    /// Flag values after the save, ordered like `flags`.
    pub after: &'a [bool],
}

impl<'a> ReconcileInput<'a> {
    /// Builds input from pre-save and post-save views of the same record.
    pub fn from_views(
        target: EntityRef,
        before: &'a VerificationView,
        after: &'a VerificationView,
    ) -> Self {
        Self {
            target,
            flags: after.flags,
            stored_status: after.status,
            before: &before.values,
            after: &after.values,
        }
    }
}

/// What one reconciliation cycle changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Status derived from the post-save flags.
    pub status: VerificationStatus,
    /// Whether the status column was written.
    pub status_written: bool,
    /// Audit entry the changed flags now reference.
    pub audit_entry: Option<AuditEntryId>,
    /// Reference columns that were written.
    pub updated_refs: Vec<&'static str>,
}

#[derive(Debug)]
pub enum ReconcileError {
    /// Snapshots do not line up with the flag list.
    SnapshotMismatch {
        target: EntityRef,
        expected: usize,
        before: usize,
        after: usize,
    },
    /// A status or reference write failed.
    Store(RepoError),
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SnapshotMismatch {
                target,
                expected,
                before,
                after,
            } => write!(
                f,
                "flag snapshot mismatch for {target}: expected {expected} flags, got {before} before and {after} after"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SnapshotMismatch { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RepoError> for ReconcileError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Brings status and audit references in line with the post-save flags.
///
/// Must run after the save's audit entry was appended, so that the latest
/// entry for the target is the one describing the flag change.
pub fn reconcile<S, A>(
    store: &S,
    audit: &A,
    input: ReconcileInput<'_>,
) -> Result<ReconcileOutcome, ReconcileError>
where
    S: VerificationStore + ?Sized,
    A: AuditLog + ?Sized,
{
    let expected = input.flags.len();
    if input.before.len() != expected || input.after.len() != expected {
        return Err(ReconcileError::SnapshotMismatch {
            target: input.target,
            expected,
            before: input.before.len(),
            after: input.after.len(),
        });
    }

    let status = derive_status(input.after);
    let status_written = status != input.stored_status;
    if status_written {
        store.write_status(input.target, status)?;
    }

    let changed = input
        .flags
        .iter()
        .zip(input.before.iter().zip(input.after.iter()))
        .filter(|(_, (old, new))| old != new)
        .map(|(flag, _)| flag.audit_ref)
        .collect::<Vec<_>>();

    if changed.is_empty() {
        debug!(
            "event=reconcile module=reconciler status=ok target={} derived={} status_written={} refs=0",
            input.target,
            status.as_str(),
            status_written
        );
        return Ok(ReconcileOutcome {
            status,
            status_written,
            audit_entry: None,
            updated_refs: Vec::new(),
        });
    }

    let latest = match audit.latest_entry(input.target.entity_type, input.target.id) {
        Ok(entry) => entry,
        Err(err) => {
            warn!(
                "event=reconcile module=reconciler status=skip target={} reason=audit_lookup_failed error={}",
                input.target, err
            );
            None
        }
    };

    let Some(entry) = latest else {
        warn!(
            "event=reconcile module=reconciler status=skip target={} reason=no_audit_entry changed={}",
            input.target,
            changed.len()
        );
        return Ok(ReconcileOutcome {
            status,
            status_written,
            audit_entry: None,
            updated_refs: Vec::new(),
        });
    };

    let refs = changed
        .iter()
        .map(|column| (*column, entry.id))
        .collect::<Vec<_>>();
    store.write_audit_refs(input.target, &refs)?;

    debug!(
        "event=reconcile module=reconciler status=ok target={} derived={} status_written={} refs={} audit_id={}",
        input.target,
        status.as_str(),
        status_written,
        changed.len(),
        entry.id
    );
    Ok(ReconcileOutcome {
        status,
        status_written,
        audit_entry: Some(entry.id),
        updated_refs: changed,
    })
}
