//! Schema migrations.
//!
//! Each migration is a SQL script embedded at compile time. The schema version
//! is kept in SQLite's `user_version` header field: migration `n` moves it from
//! `n - 1` to `n` in the same transaction as its DDL.

use rusqlite::Connection;
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// `(description, sql)` in version order, starting at version 1.
const MIGRATIONS: &[(&str, &str)] = &[(
    "events table with recurring series columns",
    include_str!("v001_events.sql"),
)];

/// Bring the schema up to the latest version. Returns how many migrations ran.
///
/// Refuses to touch a database whose version is newer than this build knows.
pub fn run_migrations(conn: &mut Connection) -> StoreResult<u32> {
    let current = current_version(conn)?;
    let latest = MIGRATIONS.len() as u32;
    if current > latest {
        return Err(StoreError::Migration(format!(
            "database schema is v{current}, this build only knows up to v{latest}"
        )));
    }

    for (version, &(description, sql)) in (1u32..).zip(MIGRATIONS).skip(current as usize) {
        info!(version, description, "applying migration");
        let fail = |e: rusqlite::Error| {
            StoreError::Migration(format!("v{version} ({description}): {e}"))
        };

        let tx = conn.transaction().map_err(fail)?;
        tx.execute_batch(sql).map_err(fail)?;
        tx.pragma_update(None, "user_version", version).map_err(fail)?;
        tx.commit().map_err(fail)?;
    }

    Ok(latest - current)
}

/// Current schema version, 0 on a fresh database.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StoreError::Migration(format!("reading user_version: {e}")))
}
