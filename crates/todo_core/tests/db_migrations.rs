use rusqlite::Connection;
use todo_core::db::migrations::latest_version;
use todo_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "todo_lists");
}

#[test]
fn reopening_a_file_keeps_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO todo_lists (id, name) VALUES ('2f1b6a0e-7d3c-4b8e-9a51-0c6f2d4e8b17', 'kept');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let items: String = conn_second
        .query_row("SELECT items FROM todo_lists WHERE name = 'kept';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(items, "[]");
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
fn items_column_rejects_non_json() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO todo_lists (id, name, items) VALUES ('x', 'bad', 'not json');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn items_column_rejects_json_that_is_not_an_array() {
    let conn = open_db_in_memory().unwrap();
    for items in ["{}", "\"text\"", "3", "null"] {
        let result = conn.execute(
            "INSERT INTO todo_lists (id, name, items) VALUES ('x', 'bad', ?1);",
            [items],
        );
        assert!(result.is_err(), "accepted items `{items}`");
    }
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
