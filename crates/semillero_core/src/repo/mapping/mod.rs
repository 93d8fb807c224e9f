//! Row mapping between resource records and their SQLite tables.
//!
//! Every `Record` impl lives here so SQL column knowledge stays inside the
//! repository boundary.

mod academics;
mod monitors;
mod people;

use crate::model::entity::RecordId;
use crate::model::verification::VerificationStatus;
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

fn uuid_value(value: Uuid) -> Value {
    Value::Text(value.to_string())
}

fn opt_uuid(value: Option<Uuid>) -> Value {
    value.map_or(Value::Null, uuid_value)
}

fn int(value: impl Into<i64>) -> Value {
    Value::Integer(value.into())
}

fn opt_int(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

fn flag(value: bool) -> Value {
    Value::Integer(if value { 1 } else { 0 })
}

fn status(value: VerificationStatus) -> Value {
    text(value.as_str())
}

fn read_uuid(row: &Row<'_>, column: &'static str) -> RepoResult<RecordId> {
    let value: String = row.get(column)?;
    parse_uuid(&value, column)
}

fn read_opt_uuid(row: &Row<'_>, column: &'static str) -> RepoResult<Option<RecordId>> {
    match row.get::<_, Option<String>>(column)? {
        Some(value) => Ok(Some(parse_uuid(&value, column)?)),
        None => Ok(None),
    }
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn read_flag(row: &Row<'_>, column: &'static str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn read_small<T: TryFrom<i64>>(row: &Row<'_>, column: &'static str) -> RepoResult<T> {
    let value: i64 = row.get(column)?;
    T::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("value `{value}` out of range in {column}")))
}

fn read_status(row: &Row<'_>) -> RepoResult<VerificationStatus> {
    let value: String = row.get("status")?;
    VerificationStatus::parse(&value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{value}` in status")))
}

/// Collects the non-empty file paths of a record.
fn files<'a>(paths: impl IntoIterator<Item = &'a Option<String>>) -> Vec<String> {
    paths
        .into_iter()
        .filter_map(|path| path.as_ref())
        .filter(|path| !path.trim().is_empty())
        .cloned()
        .collect()
}
