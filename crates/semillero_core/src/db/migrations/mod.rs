//! Ordered schema scripts for the enrollment database.
//!
//! # Invariants
//! - Versions start at 1 and increase by one per script.
//! - A run applies every pending script in one transaction or none of them.

use crate::db::{schema_version, DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, name, sql)` in application order.
const MIGRATIONS: &[(u32, &str, &str)] = &[
    (1, "identity_audit", include_str!("0001_identity_audit.sql")),
    (2, "people", include_str!("0002_people.sql")),
    (3, "academics", include_str!("0003_academics.sql")),
    (4, "monitors", include_str!("0004_monitors.sql")),
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(version, _, _)| *version)
}

/// Brings `conn` up to `latest_version`; returns the versions applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<Vec<u32>> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|(version, _, _)| *version > from)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let tx = conn.transaction()?;
    for (version, name, sql) in &pending {
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version: *version,
                name: *name,
                source,
            })?;
    }
    tx.commit()?;

    let applied = pending.iter().map(|(version, _, _)| *version).collect::<Vec<_>>();
    info!(
        "event=db_migrate module=db status=ok from={from} to={latest} applied={}",
        applied.len()
    );
    Ok(applied)
}
