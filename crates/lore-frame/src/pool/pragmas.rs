//! PRAGMA configuration applied to every SQLite connection.
//!
//! Writer: WAL, NORMAL sync, 64MB cache. Readers: query_only. Readers
//! never enable read_uncommitted; in-memory stores keep them off the
//! writer's open transactions with a [`super::WriteGate`] instead.

use std::time::Duration;

use rusqlite::Connection;

use lore_core::LoreResult;

use crate::to_storage_err;

/// Apply the writer pragmas.
pub fn apply_pragmas(conn: &Connection, busy_timeout_ms: u32) -> LoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -64000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    set_busy_timeout(conn, busy_timeout_ms)
}

/// Apply the reader pragmas.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u32) -> LoreResult<()> {
    conn.execute_batch("PRAGMA query_only = ON;")
        .map_err(|e| to_storage_err(e.to_string()))?;
    set_busy_timeout(conn, busy_timeout_ms)
}

fn set_busy_timeout(conn: &Connection, busy_timeout_ms: u32) -> LoreResult<()> {
    conn.busy_timeout(Duration::from_millis(u64::from(busy_timeout_ms)))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Verify that WAL mode is active on a connection. In-memory databases
/// report `memory` and return false.
pub fn verify_wal_mode(conn: &Connection) -> LoreResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
