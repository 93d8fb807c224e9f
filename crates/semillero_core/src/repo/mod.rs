//! Persistence for resource records, principals and the audit log.
//!
//! # Responsibility
//! - Map records to SQLite rows and back.
//! - Keep SQL out of the controllers and the reconciler.
//!
//! # Invariants
//! - Repository writes enforce record validation before persistence.
//! - Updates write only the columns whose value actually changed.
//! - Repository APIs return semantic errors (`NotFound`, `Constraint`) in
//!   addition to DB transport errors.

pub mod audit_repo;
pub mod auth_repo;
mod mapping;
pub mod record_repo;
pub mod verification_repo;

use crate::db::migrations::latest_version;
use crate::db::schema_version;
use crate::db::DbError;
use crate::model::entity::{EntityRef, UserId};
use crate::model::validation::ValidationError;
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every persistence contract.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed field validation; nothing was written.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target record does not exist.
    NotFound(EntityRef),
    /// Target principal does not exist.
    UserNotFound(UserId),
    /// Unique/foreign-key/check constraint rejected the write.
    Constraint(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(target) => write!(f, "record not found: {target}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Constraint(message) => write!(f, "constraint violation: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::UserNotFound(_) => None,
            Self::Constraint(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Self::Constraint(
                    message
                        .clone()
                        .unwrap_or_else(|| "constraint failed".to_string()),
                )
            }
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Current wall clock in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Converts a bound SQLite value into its audit payload form.
pub(crate) fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(number) => serde_json::Value::from(*number),
        Value::Real(number) => serde_json::Value::from(*number),
        Value::Text(text) => serde_json::Value::from(text.as_str()),
        Value::Blob(bytes) => serde_json::Value::from(format!("<{} bytes>", bytes.len())),
    }
}

/// Rejects connections that did not go through `open_db*`.
pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = schema_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::value_to_json;
    use rusqlite::types::Value;

    #[test]
    fn json_payload_keeps_scalar_types() {
        assert_eq!(value_to_json(&Value::Integer(1)), serde_json::json!(1));
        assert_eq!(
            value_to_json(&Value::Text("pending".to_string())),
            serde_json::json!("pending")
        );
        assert_eq!(value_to_json(&Value::Null), serde_json::Value::Null);
        assert_eq!(
            value_to_json(&Value::Blob(vec![1, 2, 3])),
            serde_json::json!("<3 bytes>")
        );
    }
}
