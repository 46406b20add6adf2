//! Versioned schema of the document table.
//!
//! Each entry of `SCHEMA_STEPS` upgrades the database by one version; the
//! applied version lives in `PRAGMA user_version`.

use super::{StoreError, StoreResult};
use rusqlite::Connection;

const SCHEMA_STEPS: &[&str] = &[
    // v1: one JSON object per (collection, key).
    "CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        doc_key TEXT NOT NULL,
        body TEXT NOT NULL CHECK (json_valid(body) AND json_type(body) = 'object'),
        updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000),
        PRIMARY KEY (collection, doc_key)
    );",
];

/// Schema version this build writes.
pub fn schema_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Brings `conn` up to `schema_version()` in a single transaction.
///
/// # Errors
/// - `StoreError::UnsupportedSchema` when the file was written by a newer build.
pub fn upgrade_schema(conn: &mut Connection) -> StoreResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let supported = schema_version();
    if found > supported {
        return Err(StoreError::UnsupportedSchema { found, supported });
    }

    let pending = &SCHEMA_STEPS[found as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step)?;
    }
    tx.pragma_update(None, "user_version", supported)?;
    tx.commit()?;
    Ok(())
}
