//! SQLite-backed document store.
//!
//! Bodies are stored as JSON text in the `documents` table. Partial updates
//! read, merge and write back inside one transaction.

use super::{Document, DocumentStore, StoreError, StoreResult};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Document store over a migrated SQLite connection.
#[derive(Clone, Copy)]
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection returned by `open_store` / `open_store_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_body(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_key = ?2;",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|text| parse_body(collection, key, &text))
            .transpose()
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn list_keys(&self, collection: &str) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT doc_key FROM documents WHERE collection = ?1 ORDER BY doc_key ASC;")?;
        let keys = stmt
            .query_map([collection], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        self.read_body(collection, key)
    }

    fn set(&self, collection: &str, key: &str, body: &Document) -> StoreResult<()> {
        let text = serde_json::to_string(body)?;
        self.conn.execute(
            "INSERT INTO documents (collection, doc_key, body)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, doc_key) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![collection, key, text],
        )?;
        debug!(
            "event=doc_set module=store status=ok collection={collection} fields={}",
            body.len()
        );
        Ok(())
    }

    fn update(&self, collection: &str, key: &str, fields: &Document) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let Some(mut body) = self.read_body(collection, key)? else {
            warn!(
                "event=doc_update module=store status=error collection={collection} error_code=not_found"
            );
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        };

        for (field, value) in fields {
            body.insert(field.clone(), value.clone());
        }

        tx.execute(
            "UPDATE documents
             SET body = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?2 AND doc_key = ?3;",
            params![serde_json::to_string(&body)?, collection, key],
        )?;
        tx.commit()?;

        debug!(
            "event=doc_update module=store status=ok collection={collection} fields={}",
            fields.len()
        );
        Ok(())
    }
}

fn parse_body(collection: &str, key: &str, text: &str) -> StoreResult<Document> {
    let invalid = |message: String| StoreError::InvalidDocument {
        collection: collection.to_string(),
        key: key.to_string(),
        message,
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(invalid(format!("expected object, found `{other}`"))),
        Err(err) => Err(invalid(err.to_string())),
    }
}
