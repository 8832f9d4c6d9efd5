//! Single write connection behind `tokio::sync::Mutex`.
//! Writes are serialized; there is at most one writer at a time.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tokio::sync::Mutex;

use lore_core::LoreResult;

use super::pragmas::apply_pragmas;
use super::WriteGate;
use crate::to_storage_err;

/// A single write connection protected by an async mutex.
pub struct WriteConnection {
    conn: Mutex<Connection>,
    gate: Option<WriteGate>,
}

impl WriteConnection {
    /// Open a new write connection to the given database path.
    pub fn open(path: &Path, busy_timeout_ms: u32) -> LoreResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
            gate: None,
        })
    }

    /// Open (and create) the database named by a `file:` URI. Each write
    /// holds `gate` exclusively, so readers never see it half done.
    pub fn open_uri(uri: &str, busy_timeout_ms: u32, gate: WriteGate) -> LoreResult<Self> {
        let conn = Connection::open_with_flags(
            uri,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
            gate: Some(gate),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub async fn with_conn<F, T>(&self, f: F) -> LoreResult<T>
    where
        F: FnOnce(&Connection) -> LoreResult<T>,
    {
        let guard = self.conn.lock().await;
        let _exclusive = self.gate.as_ref().map(WriteGate::exclusive).transpose()?;
        f(&guard)
    }
}
