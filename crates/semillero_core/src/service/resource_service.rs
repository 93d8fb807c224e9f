//! Generic resource controller.
//!
//! # Responsibility
//! - Provide list/create/retrieve/update/partial_update/destroy for every
//!   `Record` type behind one role check.
//! - Run the save cycle (load, validate, write, audit, reconcile) as one
//!   immediate transaction.
//! - Remove stored files once the database no longer references them.
//!
//! # Invariants
//! - Authorization happens before any read or write.
//! - Every persisted change appends exactly one audit entry stamped with
//!   the acting user; saves without changed columns append nothing.
//! - Tracked records are reconciled inside the same transaction, after the
//!   audit entry is appended.
//! - A linked login principal exists, holds the record's role and belongs
//!   to no other record.
//! - File cleanup runs after commit and never fails the operation.

use crate::auth::{Action, Actor};
use crate::model::audit::{AuditAction, AuditEntry, NewAuditEntry};
use crate::model::entity::{EntityRef, RecordId};
use crate::model::validation::ValidationError;
use crate::model::Patch;
use crate::reconciler::{reconcile, ReconcileInput};
use crate::repo::audit_repo::{AuditLog, SqliteAuditLog};
use crate::repo::auth_repo::{AuthRepository, PrincipalRemoval, SqliteAuthRepository};
use crate::repo::record_repo::{snapshot_changes, ListQuery, Record, SqliteRecordRepository};
use crate::repo::verification_repo::SqliteVerificationStore;
use crate::service::{ServiceError, ServiceResult};
use crate::storage::{best_effort_cleanup, store_upload, CleanupReport, FileStore};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::marker::PhantomData;

/// Result of destroying one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyOutcome {
    pub target: EntityRef,
    /// Set when the record owned a login principal.
    pub principal: Option<PrincipalRemoval>,
    pub cleanup: CleanupReport,
}

/// Request-level operations for one record type.
pub struct ResourceController<'a, R, F: ?Sized> {
    conn: &'a Connection,
    files: &'a F,
    _record: PhantomData<fn() -> R>,
}

impl<'a, R: Record, F: FileStore + ?Sized> ResourceController<'a, R, F> {
    /// Creates a controller over a migrated connection and a file store.
    pub fn new(conn: &'a Connection, files: &'a F) -> ServiceResult<Self> {
        SqliteRecordRepository::<R>::try_new(conn)?;
        Ok(Self {
            conn,
            files,
            _record: PhantomData,
        })
    }

    pub fn list(&self, actor: &Actor, query: &ListQuery) -> ServiceResult<Vec<R>> {
        actor.authorize(R::ENTITY, Action::List)?;
        Ok(SqliteRecordRepository::<R>::try_new(self.conn)?.list(query)?)
    }

    pub fn retrieve(&self, actor: &Actor, id: RecordId) -> ServiceResult<R> {
        actor.authorize(R::ENTITY, Action::Retrieve)?;
        Ok(SqliteRecordRepository::<R>::try_new(self.conn)?.get_required(id)?)
    }

    /// Audit history of one record, newest first.
    pub fn history(
        &self,
        actor: &Actor,
        id: RecordId,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<AuditEntry>> {
        actor.authorize(R::ENTITY, Action::Retrieve)?;
        Ok(SqliteAuditLog::try_new(self.conn)?.list_entries(R::ENTITY, id, limit)?)
    }

    /// Inserts a new record.
    ///
    /// Derived verification state supplied by the caller is discarded: tracked
    /// records start with every flag false and `NotReviewed`, which is
    /// already reconciled.
    pub fn create(&self, actor: &Actor, mut record: R) -> ServiceResult<R> {
        actor.authorize(R::ENTITY, Action::Create)?;
        record.reset_derived();
        record.validate()?;
        let target = record.entity_ref();

        in_immediate_tx(self.conn, |conn| {
            check_principal_link(conn, &record)?;
            SqliteRecordRepository::<R>::try_new(conn)?.insert(&record)?;
            SqliteAuditLog::try_new(conn)?.append(&NewAuditEntry {
                entity_type: R::ENTITY,
                entity_id: record.id(),
                actor_id: Some(actor.user_id),
                action: AuditAction::Create,
                changes: snapshot_changes(&record, false),
            })?;
            Ok(())
        })?;

        info!(
            "event=resource_write module=service status=ok action=create target={target} actor={}",
            actor.user_id
        );
        self.read_back(record.id())
    }

    /// Full replacement. `id` and derived verification state come from the
    /// stored row; verification flags are taken from `replacement`.
    pub fn update(&self, actor: &Actor, replacement: R) -> ServiceResult<R> {
        actor.authorize(R::ENTITY, Action::Update)?;
        self.save(actor, replacement.id(), move |stored| {
            let mut next = replacement;
            next.keep_derived_from(stored);
            next
        })
    }

    pub fn partial_update(&self, actor: &Actor, id: RecordId, patch: &R::Patch) -> ServiceResult<R> {
        actor.authorize(R::ENTITY, Action::Update)?;
        self.save(actor, id, |stored| {
            let mut next = stored.clone();
            patch.apply_to(&mut next);
            next
        })
    }

    /// Partial update from a JSON object, as received on the wire.
    ///
    /// Unknown keys and derived fields (`status`, `*_audit_id`) are rejected.
    pub fn partial_update_json(
        &self,
        actor: &Actor,
        id: RecordId,
        payload: serde_json::Value,
    ) -> ServiceResult<R> {
        actor.authorize(R::ENTITY, Action::Update)?;
        let patch: R::Patch = serde_json::from_value(payload)
            .map_err(|err| ServiceError::InvalidPayload(err.to_string()))?;
        self.partial_update(actor, id, &patch)
    }

    /// Stores an upload and points `field` at it.
    ///
    /// The previous file of the field, if any, is removed after commit. A
    /// failed save removes the freshly stored file again.
    pub fn attach_file(
        &self,
        actor: &Actor,
        id: RecordId,
        field: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> ServiceResult<R> {
        actor.authorize(R::ENTITY, Action::Update)?;
        if !field.ends_with("_file") || !R::COLUMNS.iter().any(|column| *column == field) {
            return Err(ServiceError::InvalidPayload(format!(
                "`{field}` is not a file field of {}",
                R::ENTITY
            )));
        }
        SqliteRecordRepository::<R>::try_new(self.conn)?.get_required(id)?;

        let path = store_upload(
            self.files,
            EntityRef::new(R::ENTITY, id),
            field,
            original_name,
            bytes,
        )?;
        let mut payload = serde_json::Map::new();
        payload.insert(field.to_string(), serde_json::Value::from(path.as_str()));

        match self.partial_update_json(actor, id, serde_json::Value::Object(payload)) {
            Ok(record) => Ok(record),
            Err(err) => {
                best_effort_cleanup(self.files, &[path]);
                Err(err)
            }
        }
    }

    /// Deletes a record, its login principal and, best-effort, its files.
    ///
    /// Rows removed by foreign-key cascades are not visited.
    pub fn destroy(&self, actor: &Actor, id: RecordId) -> ServiceResult<DestroyOutcome> {
        actor.authorize(R::ENTITY, Action::Destroy)?;

        let (record, principal) = in_immediate_tx(self.conn, |conn| {
            let repo = SqliteRecordRepository::<R>::try_new(conn)?;
            let record = repo.get_required(id)?;
            repo.delete(id)?;
            SqliteAuditLog::try_new(conn)?.append(&NewAuditEntry {
                entity_type: R::ENTITY,
                entity_id: id,
                actor_id: Some(actor.user_id),
                action: AuditAction::Delete,
                changes: snapshot_changes(&record, true),
            })?;

            let principal = match record.principal() {
                Some(user_id) => {
                    Some(SqliteAuthRepository::try_new(conn)?.delete_principal(user_id)?)
                }
                None => None,
            };
            Ok((record, principal))
        })?;

        let cleanup = best_effort_cleanup(self.files, &record.stored_files());
        let target = record.entity_ref();
        info!(
            "event=resource_destroy module=service status=ok target={target} actor={} principal_removed={} files_removed={} files_failed={}",
            actor.user_id,
            principal.is_some_and(|removal| removal.user_removed),
            cleanup.removed.len(),
            cleanup.failed.len()
        );
        Ok(DestroyOutcome {
            target,
            principal,
            cleanup,
        })
    }

    /// Loads, edits and persists one record inside an immediate transaction.
    fn save(
        &self,
        actor: &Actor,
        id: RecordId,
        edit: impl FnOnce(&R) -> R,
    ) -> ServiceResult<R> {
        let (before, after, changed) = in_immediate_tx(self.conn, |conn| {
            let repo = SqliteRecordRepository::<R>::try_new(conn)?;
            let before = repo.get_required(id)?;
            let after = edit(&before);
            if after.principal() != before.principal() {
                check_principal_link(conn, &after)?;
            }
            let changes = repo.write_changes(&before, &after)?;
            let changed = changes.len();

            let audit = SqliteAuditLog::try_new(conn)?;
            if !changes.is_empty() {
                audit.append(&NewAuditEntry {
                    entity_type: R::ENTITY,
                    entity_id: id,
                    actor_id: Some(actor.user_id),
                    action: AuditAction::Update,
                    changes,
                })?;
            }

            if let (Some(old_view), Some(new_view)) = (before.verification(), after.verification()) {
                let store = SqliteVerificationStore::try_new(conn)?;
                reconcile(
                    &store,
                    &audit,
                    ReconcileInput::from_views(before.entity_ref(), &old_view, &new_view),
                )?;
            }
            Ok((before, after, changed))
        })?;

        info!(
            "event=resource_write module=service status=ok action=update target={} actor={} fields={changed}",
            before.entity_ref(),
            actor.user_id
        );

        let kept = after.stored_files();
        let replaced = before
            .stored_files()
            .into_iter()
            .filter(|path| !kept.contains(path))
            .collect::<Vec<_>>();
        best_effort_cleanup(self.files, &replaced);

        self.read_back(id)
    }

    fn read_back(&self, id: RecordId) -> ServiceResult<R> {
        Ok(SqliteRecordRepository::<R>::try_new(self.conn)?.get_required(id)?)
    }
}

/// Rejects a principal that is missing, holds another role, or is already
/// linked to a different record.
fn check_principal_link<R: Record>(conn: &Connection, record: &R) -> ServiceResult<()> {
    let (Some(user_id), Some(role)) = (record.principal(), R::PRINCIPAL_ROLE) else {
        return Ok(());
    };
    let auth = SqliteAuthRepository::try_new(conn)?;
    let account = auth.get_user(user_id)?.ok_or(ValidationError::Inconsistent {
        field: "user_id",
        reason: "does not reference an existing user",
    })?;
    if account.role != role {
        return Err(ValidationError::Inconsistent {
            field: "user_id",
            reason: "references a user with a different role",
        }
        .into());
    }
    match auth.linked_record(user_id)? {
        Some(owner) if owner != record.entity_ref() => Err(ValidationError::Inconsistent {
            field: "user_id",
            reason: "is already linked to another record",
        }
        .into()),
        _ => Ok(()),
    }
}

fn in_immediate_tx<T>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> ServiceResult<T>,
) -> ServiceResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}
