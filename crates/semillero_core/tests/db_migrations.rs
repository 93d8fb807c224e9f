use rusqlite::Connection;
use semillero_core::db::migrations::{apply_migrations, latest_version};
use semillero_core::db::{open_db, open_db_in_memory, schema_version, DbError};

const TABLES: &[&str] = &[
    "users",
    "access_tokens",
    "audit_log",
    "students",
    "guardians",
    "professors",
    "modules",
    "academic_offers",
    "enrollments",
    "diagnostic_tests",
    "attendance",
    "payments",
    "academic_monitors",
    "administrative_monitors",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("semillero.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first).unwrap(), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    assert_table_exists(&conn_second, "enrollments");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn audit_log_rejects_updates_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO audit_log (entity_type, entity_id, action, recorded_at)
         VALUES ('module', 'm-1', 'create', 1);",
        [],
    )
    .unwrap();

    assert!(conn
        .execute("UPDATE audit_log SET action = 'delete';", [])
        .is_err());
    assert!(conn.execute("DELETE FROM audit_log;", []).is_err());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM audit_log;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn enrollment_status_column_only_accepts_known_tags() {
    let conn = open_db_in_memory().unwrap();
    let check: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'enrollments';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(check.contains("'not_reviewed'"));
    assert!(check.contains("'reviewed'"));
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

#[test]
fn reapplying_migrations_is_a_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    assert!(apply_migrations(&mut conn).unwrap().is_empty());
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
}
