//! Append-only audit log contracts and SQLite implementation.
//!
//! # Responsibility
//! - Record who changed which columns of which resource, and when.
//! - Answer "latest entry for this entity" for the verification reconciler.
//!
//! # Invariants
//! - Entries are never updated or deleted (enforced by schema triggers).
//! - `recorded_at` never decreases for one entity, so the latest entry by
//!   timestamp is also the last one appended.

use crate::model::audit::{AuditAction, AuditEntry, AuditEntryId, FieldChange, NewAuditEntry};
use crate::model::entity::{EntityType, RecordId};
use crate::repo::{ensure_schema_ready, now_epoch_ms, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const AUDIT_SELECT_SQL: &str = "SELECT
    id,
    entity_type,
    entity_id,
    actor_id,
    action,
    recorded_at,
    changes
FROM audit_log";

pub const AUDIT_DEFAULT_LIMIT: u32 = 100;
pub const AUDIT_LIMIT_MAX: u32 = 500;

/// Normalizes history limit: `None`/`0` use the default, large values are capped.
pub fn normalize_history_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => AUDIT_DEFAULT_LIMIT,
        Some(value) => value.min(AUDIT_LIMIT_MAX),
    }
}

/// Audit log access used by controllers and the reconciler.
pub trait AuditLog {
    /// Appends one entry and returns its id.
    fn append(&self, entry: &NewAuditEntry) -> RepoResult<AuditEntryId>;
    /// Most recent entry for one entity, ordered by `recorded_at DESC, id DESC`.
    fn latest_entry(
        &self,
        entity_type: EntityType,
        entity_id: RecordId,
    ) -> RepoResult<Option<AuditEntry>>;
    /// Entity history, newest first.
    fn list_entries(
        &self,
        entity_type: EntityType,
        entity_id: RecordId,
        limit: Option<u32>,
    ) -> RepoResult<Vec<AuditEntry>>;
}

/// SQLite-backed audit log.
pub struct SqliteAuditLog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditLog<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AuditLog for SqliteAuditLog<'_> {
    fn append(&self, entry: &NewAuditEntry) -> RepoResult<AuditEntryId> {
        let changes = serde_json::to_string(&entry.changes)
            .map_err(|err| RepoError::InvalidData(format!("unserializable audit payload: {err}")))?;

        let last_recorded_at: Option<i64> = self.conn.query_row(
            "SELECT MAX(recorded_at)
             FROM audit_log
             WHERE entity_type = ?1 AND entity_id = ?2;",
            params![entry.entity_type.as_str(), entry.entity_id.to_string()],
            |row| row.get(0),
        )?;
        let recorded_at = last_recorded_at.map_or(now_epoch_ms(), |last| last.max(now_epoch_ms()));

        self.conn.execute(
            "INSERT INTO audit_log (
                entity_type,
                entity_id,
                actor_id,
                action,
                recorded_at,
                changes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.entity_type.as_str(),
                entry.entity_id.to_string(),
                entry.actor_id.map(|id| id.to_string()),
                entry.action.as_str(),
                recorded_at,
                changes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "event=audit_append module=repo status=ok entity_type={} action={} audit_id={} fields={}",
            entry.entity_type,
            entry.action.as_str(),
            id,
            entry.changes.len()
        );
        Ok(id)
    }

    fn latest_entry(
        &self,
        entity_type: EntityType,
        entity_id: RecordId,
    ) -> RepoResult<Option<AuditEntry>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "{AUDIT_SELECT_SQL}
                     WHERE entity_type = ?1 AND entity_id = ?2
                     ORDER BY recorded_at DESC, id DESC
                     LIMIT 1;"
                ),
                params![entity_type.as_str(), entity_id.to_string()],
                |row| Ok(parse_audit_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn list_entries(
        &self,
        entity_type: EntityType,
        entity_id: RecordId,
        limit: Option<u32>,
    ) -> RepoResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUDIT_SELECT_SQL}
             WHERE entity_type = ?1 AND entity_id = ?2
             ORDER BY recorded_at DESC, id DESC
             LIMIT ?3;"
        ))?;
        let mut rows = stmt.query(params![
            entity_type.as_str(),
            entity_id.to_string(),
            i64::from(normalize_history_limit(limit)),
        ])?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_audit_row(row)?);
        }
        Ok(entries)
    }
}

fn parse_audit_row(row: &Row<'_>) -> RepoResult<AuditEntry> {
    let entity_type_text: String = row.get("entity_type")?;
    let entity_type = EntityType::parse(&entity_type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid entity type `{entity_type_text}` in audit_log.entity_type"
        ))
    })?;

    let entity_id_text: String = row.get("entity_id")?;
    let entity_id = Uuid::parse_str(&entity_id_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{entity_id_text}` in audit_log.entity_id"
        ))
    })?;

    let actor_id = match row.get::<_, Option<String>>("actor_id")? {
        Some(value) => Some(Uuid::parse_str(&value).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{value}` in audit_log.actor_id"))
        })?),
        None => None,
    };

    let action_text: String = row.get("action")?;
    let action = AuditAction::parse(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid action `{action_text}` in audit_log.action"))
    })?;

    let changes_text: String = row.get("changes")?;
    let changes: Vec<FieldChange> = serde_json::from_str(&changes_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid payload in audit_log.changes: {err}"))
    })?;

    Ok(AuditEntry {
        id: row.get("id")?,
        entity_type,
        entity_id,
        actor_id,
        action,
        recorded_at: row.get("recorded_at")?,
        changes,
    })
}
