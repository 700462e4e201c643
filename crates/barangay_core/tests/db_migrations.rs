use barangay_core::db::migrations::latest_version;
use barangay_core::db::{open_db, open_db_in_memory, ConstraintViolation, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "households");
    assert_table_exists(&conn, "residents");
    assert_column_exists(&conn, "households", "latitude");
    assert_column_exists(&conn, "households", "longitude");
    assert_column_exists(&conn, "households", "head_of_household_id");
    for table in [
        "officials",
        "ordinances",
        "activities",
        "reports",
        "certificates",
        "documents",
        "document_tags",
        "document_tag_links",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO residents (id, first_name, last_name, date_of_birth, gender, household_id, house_number)
             VALUES ('r1', 'Juan', 'Cruz', '1990-01-01', 'male', 'missing-household', '1');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn reopening_file_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("barangay.sqlite3");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO households (id, house_number) VALUES ('h1', '101');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM households;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreachable_db_path_reports_open_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("barangay.sqlite3");

    match open_db(&path).unwrap_err() {
        DbError::Open { target, .. } => assert!(target.ends_with("barangay.sqlite3")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_ordinance_number_is_a_unique_violation() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO ordinances (id, ordinance_number, title, date_enacted)
                  VALUES (?1, '2024-001', 'Curfew', '2024-01-15');";
    conn.execute(insert, ["o1"]).unwrap();
    let err = DbError::from(conn.execute(insert, ["o2"]).unwrap_err());
    assert_eq!(err.constraint_violation(), Some(ConstraintViolation::Unique));
}

#[test]
fn blank_house_number_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO households (id, house_number) VALUES ('h1', '   ');",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
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

fn assert_column_exists(conn: &Connection, table_name: &str, column: &str) {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table_name});"))
        .unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(1))
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert!(
        columns.iter().any(|name| name == column),
        "column {table_name}.{column} does not exist"
    );
}
