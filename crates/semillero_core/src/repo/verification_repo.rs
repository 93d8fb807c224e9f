//! SQLite writes for derived verification columns.
//!
//! # Invariants
//! - Only the `status` column or the named reference columns are touched.
//! - Reference column names must belong to the target's flag list.

use crate::model::audit::AuditEntryId;
use crate::model::entity::{EntityRef, EntityType};
use crate::model::enrollment::ENROLLMENT_FLAGS;
use crate::model::monitor::{ACADEMIC_MONITOR_FLAGS, ADMINISTRATIVE_MONITOR_FLAGS};
use crate::model::verification::{FlagSpec, VerificationStatus};
use crate::reconciler::VerificationStore;
use crate::repo::{ensure_schema_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

/// Flag list of a tracked entity type, `None` for untracked types.
pub fn tracked_flags(entity_type: EntityType) -> Option<&'static [FlagSpec]> {
    match entity_type {
        EntityType::Enrollment => Some(ENROLLMENT_FLAGS),
        EntityType::AcademicMonitor => Some(ACADEMIC_MONITOR_FLAGS),
        EntityType::AdministrativeMonitor => Some(ADMINISTRATIVE_MONITOR_FLAGS),
        _ => None,
    }
}

pub struct SqliteVerificationStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVerificationStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl VerificationStore for SqliteVerificationStore<'_> {
    fn write_status(&self, target: EntityRef, status: VerificationStatus) -> RepoResult<()> {
        require_tracked(target)?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET status = ?1 WHERE id = ?2;",
                target.entity_type.table_name()
            ),
            params![status.as_str(), target.id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(target));
        }
        Ok(())
    }

    fn write_audit_refs(
        &self,
        target: EntityRef,
        refs: &[(&'static str, AuditEntryId)],
    ) -> RepoResult<()> {
        let flags = require_tracked(target)?;
        if refs.is_empty() {
            return Ok(());
        }

        for (column, _) in refs {
            if !flags.iter().any(|flag| flag.audit_ref == *column) {
                return Err(RepoError::InvalidData(format!(
                    "`{column}` is not an audit reference of {}",
                    target.entity_type
                )));
            }
        }

        let assignments = refs
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ?{};",
            target.entity_type.table_name(),
            refs.len() + 1
        );

        let mut values = refs
            .iter()
            .map(|(_, id)| Value::Integer(*id))
            .collect::<Vec<_>>();
        values.push(Value::Text(target.id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(target));
        }
        Ok(())
    }
}

fn require_tracked(target: EntityRef) -> RepoResult<&'static [FlagSpec]> {
    tracked_flags(target.entity_type).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "{} does not carry verification state",
            target.entity_type
        ))
    })
}
