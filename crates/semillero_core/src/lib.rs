//! Core domain logic for the Semillero enrollment program.
//! This crate is the single source of truth for enrollment and verification
//! invariants.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconciler;
pub mod repo;
pub mod service;
pub mod storage;

pub use auth::{parse_role, role_allows, AccessDenied, Action, Actor, Role};
pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::audit::{AuditAction, AuditEntry, AuditEntryId, FieldChange};
pub use model::entity::{EntityRef, EntityType, RecordId, UserId};
pub use model::verification::{derive_status, FlagSpec, VerificationStatus};
pub use reconciler::{reconcile, ReconcileError, ReconcileInput, ReconcileOutcome, VerificationStore};
pub use repo::audit_repo::{AuditLog, SqliteAuditLog};
pub use repo::auth_repo::{AuthRepository, SqliteAuthRepository, UserAccount};
pub use repo::record_repo::{ListQuery, Record, SqliteRecordRepository};
pub use repo::{RepoError, RepoResult};
pub use service::{DestroyOutcome, ResourceController, ServiceError, ServiceResult};
pub use storage::{CleanupReport, FileStore, LocalFileStore, StorageError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
