use garden_core::store::schema::schema_version;
use garden_core::{
    open_store, open_store_in_memory, DocumentStore, SqliteDocumentStore, StoreError,
};
use rusqlite::Connection;
use serde_json::json;

fn body(value: serde_json::Value) -> garden_core::Document {
    value.as_object().cloned().unwrap()
}

fn user_version(conn: &Connection) -> u32 {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap()
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM documents;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn fresh_store_is_at_current_schema() {
    let conn = open_store_in_memory().unwrap();
    assert_eq!(user_version(&conn), schema_version());
    assert_eq!(row_count(&conn), 0);
}

#[test]
fn documents_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gardens.sqlite3");

    {
        let conn = open_store(&path).unwrap();
        SqliteDocumentStore::new(&conn)
            .set("gardens", "Maple St", &body(json!({"location": "12 Maple St"})))
            .unwrap();
    }

    let conn = open_store(&path).unwrap();
    assert_eq!(user_version(&conn), schema_version());
    let stored = SqliteDocumentStore::new(&conn)
        .get("gardens", "Maple St")
        .unwrap();
    assert_eq!(stored, Some(body(json!({"location": "12 Maple St"}))));
}

#[test]
fn store_written_by_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    {
        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", 999).unwrap();
    }

    match open_store(&path).unwrap_err() {
        StoreError::UnsupportedSchema { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, schema_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn body_must_be_a_json_object() {
    let conn = open_store_in_memory().unwrap();
    for bad in ["[1]", "\"text\"", "not json"] {
        let result = conn.execute(
            "INSERT INTO documents (collection, doc_key, body) VALUES ('gardens', 'x', ?1);",
            [bad],
        );
        assert!(result.is_err(), "body `{bad}` should be rejected");
    }
    assert_eq!(row_count(&conn), 0);
}

#[test]
fn key_is_scoped_by_collection_and_unique_within_it() {
    let conn = open_store_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);

    store.set("gardens", "shared", &body(json!({"v": 1}))).unwrap();
    store.set("users", "shared", &body(json!({"v": 2}))).unwrap();
    store.set("gardens", "shared", &body(json!({"v": 3}))).unwrap();
    assert_eq!(row_count(&conn), 2);

    let duplicate = conn.execute(
        "INSERT INTO documents (collection, doc_key, body) VALUES ('gardens', 'shared', '{}');",
        [],
    );
    assert!(duplicate.is_err());
    assert_eq!(
        store.get("gardens", "shared").unwrap(),
        Some(body(json!({"v": 3})))
    );
}
