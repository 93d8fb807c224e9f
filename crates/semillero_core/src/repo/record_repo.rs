//! Generic record repository over one SQLite table per resource.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete for every `Record` type.
//! - Compute per-column diffs so updates only touch changed columns.
//!
//! # Invariants
//! - Write paths call `Record::validate()` before SQL mutations.
//! - Non-null `*_file` columns only name uploads stored for the same record
//!   and field.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Column names come from `Record::COLUMNS` constants, never from input.

use crate::auth::Role;
use crate::model::audit::FieldChange;
use crate::model::entity::{EntityRef, EntityType, RecordId, UserId};
use crate::model::validation::ValidationError;
use crate::model::verification::VerificationView;
use crate::model::Patch;
use crate::repo::{ensure_schema_ready, value_to_json, RepoError, RepoResult};
use crate::storage::is_owned_upload;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

pub const LIST_DEFAULT_LIMIT: u32 = 50;
pub const LIST_LIMIT_MAX: u32 = 200;

/// Persistence contract implemented by every resource record.
pub trait Record: Clone + Sized {
    const ENTITY: EntityType;
    /// Persisted columns other than `id`, in `to_values` order.
    const COLUMNS: &'static [&'static str];
    /// Column used by `ListQuery::parent_id`, if the record has a parent.
    const PARENT_COLUMN: Option<&'static str> = None;
    /// Role a linked login principal must hold.
    const PRINCIPAL_ROLE: Option<Role> = None;

    /// Typed partial update; also the wire shape of PATCH payloads.
    type Patch: Patch<Self> + DeserializeOwned;

    fn id(&self) -> RecordId;
    fn validate(&self) -> Result<(), ValidationError>;
    /// Values aligned with `COLUMNS`.
    fn to_values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// Login principal owned by this record.
    fn principal(&self) -> Option<UserId> {
        None
    }

    /// Relative paths of stored files referenced by this record.
    fn stored_files(&self) -> Vec<String> {
        Vec::new()
    }

    /// Verification state for tracked records.
    fn verification(&self) -> Option<VerificationView> {
        None
    }

    /// Normalizes derived state before the first insert.
    fn reset_derived(&mut self) {}

    /// Copies derived state from the stored row before a full replacement.
    fn keep_derived_from(&mut self, _stored: &Self) {}

    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(Self::ENTITY, self.id())
    }
}

/// Query options for listing records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Filters on `Record::PARENT_COLUMN`; ignored for records without parent.
    pub parent_id: Option<RecordId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Normalizes list limit: `None`/`0` use the default, large values are capped.
pub fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => LIST_DEFAULT_LIMIT,
        Some(value) if value > LIST_LIMIT_MAX => LIST_LIMIT_MAX,
        Some(value) => value,
    }
}

/// SQLite-backed repository for one record type.
pub struct SqliteRecordRepository<'conn, R: Record> {
    conn: &'conn Connection,
    _record: PhantomData<R>,
}

impl<'conn, R: Record> SqliteRecordRepository<'conn, R> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self {
            conn,
            _record: PhantomData,
        })
    }

    pub fn insert(&self, record: &R) -> RepoResult<()> {
        record.validate()?;
        check_file_columns(record)?;

        let columns = R::COLUMNS.join(", ");
        let placeholders = (1..=R::COLUMNS.len() + 1)
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} (id, {columns}) VALUES ({placeholders});",
            R::ENTITY.table_name()
        );

        let mut values = vec![Value::Text(record.id().to_string())];
        values.extend(record.to_values());
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<R>> {
        let sql = format!("{} WHERE id = ?1;", select_sql::<R>());
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(R::from_row(row)?));
        }
        Ok(None)
    }

    /// Loads one record or fails with `NotFound`.
    pub fn get_required(&self, id: RecordId) -> RepoResult<R> {
        self.get(id)?
            .ok_or(RepoError::NotFound(EntityRef::new(R::ENTITY, id)))
    }

    pub fn list(&self, query: &ListQuery) -> RepoResult<Vec<R>> {
        let mut sql = format!("{} WHERE 1 = 1", select_sql::<R>());
        let mut bind_values: Vec<Value> = Vec::new();

        if let (Some(column), Some(parent_id)) = (R::PARENT_COLUMN, query.parent_id) {
            sql.push_str(&format!(" AND {column} = ?"));
            bind_values.push(Value::Text(parent_id.to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, id ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_list_limit(query.limit))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(R::from_row(row)?);
        }
        Ok(records)
    }

    /// Persists the columns that differ between `before` and `after`.
    ///
    /// Returns the column transitions that were written; an empty result
    /// means no SQL was issued.
    pub fn write_changes(&self, before: &R, after: &R) -> RepoResult<Vec<FieldChange>> {
        after.validate()?;
        check_file_columns(after)?;
        if before.id() != after.id() {
            return Err(RepoError::InvalidData(format!(
                "cannot diff {} against {}",
                before.entity_ref(),
                after.entity_ref()
            )));
        }

        let changed = diff_columns(R::COLUMNS, &before.to_values(), &after.to_values());
        if changed.is_empty() {
            return Ok(Vec::new());
        }

        let fields = changed
            .iter()
            .map(|(column, _, new)| (*column, new.clone()))
            .collect::<Vec<_>>();
        self.write_fields(after.id(), &fields)?;

        Ok(changed
            .into_iter()
            .map(|(column, old, new)| FieldChange {
                field: column.to_string(),
                old: value_to_json(&old),
                new: value_to_json(&new),
            })
            .collect())
    }

    /// Writes exactly the named columns of one row.
    pub fn write_fields(&self, id: RecordId, fields: &[(&str, Value)]) -> RepoResult<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let assignments = fields
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ?{};",
            R::ENTITY.table_name(),
            fields.len() + 1
        );

        let mut values = fields
            .iter()
            .map(|(_, value)| value.clone())
            .collect::<Vec<_>>();
        values.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::new(R::ENTITY, id)));
        }
        Ok(())
    }

    pub fn delete(&self, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", R::ENTITY.table_name()),
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::new(R::ENTITY, id)));
        }
        Ok(())
    }
}

/// Audit payload for a freshly inserted or deleted record.
pub fn snapshot_changes<R: Record>(record: &R, deleted: bool) -> Vec<FieldChange> {
    R::COLUMNS
        .iter()
        .zip(record.to_values())
        .map(|(column, value)| {
            let value = value_to_json(&value);
            let (old, new) = if deleted {
                (value, serde_json::Value::Null)
            } else {
                (serde_json::Value::Null, value)
            };
            FieldChange {
                field: (*column).to_string(),
                old,
                new,
            }
        })
        .collect()
}

/// Rejects file columns that point at another record's or field's upload.
fn check_file_columns<R: Record>(record: &R) -> Result<(), ValidationError> {
    let owner = record.entity_ref();
    for (&column, value) in R::COLUMNS.iter().zip(record.to_values()) {
        if !column.ends_with("_file") {
            continue;
        }
        if let Value::Text(path) = value {
            if !is_owned_upload(owner, column, &path) {
                return Err(ValidationError::InvalidFormat {
                    field: column,
                    expected: "an upload stored for this record and field",
                });
            }
        }
    }
    Ok(())
}

fn select_sql<R: Record>() -> String {
    format!(
        "SELECT id, {} FROM {}",
        R::COLUMNS.join(", "),
        R::ENTITY.table_name()
    )
}

fn diff_columns(
    columns: &'static [&'static str],
    before: &[Value],
    after: &[Value],
) -> Vec<(&'static str, Value, Value)> {
    columns
        .iter()
        .zip(before.iter().zip(after.iter()))
        .filter(|(_, (old, new))| old != new)
        .map(|(column, (old, new))| (*column, old.clone(), new.clone()))
        .collect()
}
