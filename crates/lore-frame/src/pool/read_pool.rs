//! Pool of 1-8 read connections. File-backed readers run beside the writer
//! under WAL; in-memory readers wait out the writer at the gate.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rusqlite::{Connection, OpenFlags};

use lore_core::LoreResult;

use super::pragmas::apply_read_pragmas;
use super::WriteGate;
use crate::to_storage_err;

/// Maximum number of read connections.
const MAX_POOL_SIZE: usize = 8;

/// A pool of read-only SQLite connections, handed out round-robin.
pub struct ReadPool {
    connections: Vec<std::sync::Mutex<Connection>>,
    next: AtomicUsize,
    gate: Option<WriteGate>,
}

impl ReadPool {
    /// Open a pool of read connections to the given database path.
    pub fn open(path: &Path, pool_size: usize, busy_timeout_ms: u32) -> LoreResult<Self> {
        let size = pool_size.clamp(1, MAX_POOL_SIZE);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            apply_read_pragmas(&conn, busy_timeout_ms)?;
            connections.push(std::sync::Mutex::new(conn));
        }
        Ok(Self::from_connections(connections, None))
    }

    /// Open readers against a shared-cache URI. Shared in-memory databases
    /// cannot be opened read-only, so `query_only` enforces it instead.
    /// Every read holds `gate` shared for its duration.
    pub fn open_uri(
        uri: &str,
        pool_size: usize,
        busy_timeout_ms: u32,
        gate: WriteGate,
    ) -> LoreResult<Self> {
        let size = pool_size.clamp(1, MAX_POOL_SIZE);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                uri,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            apply_read_pragmas(&conn, busy_timeout_ms)?;
            connections.push(std::sync::Mutex::new(conn));
        }
        Ok(Self::from_connections(connections, Some(gate)))
    }

    fn from_connections(
        connections: Vec<std::sync::Mutex<Connection>>,
        gate: Option<WriteGate>,
    ) -> Self {
        Self {
            connections,
            next: AtomicUsize::new(0),
            gate,
        }
    }

    /// Execute a closure with a read connection from the pool (round-robin).
    /// Blocking; async callers go through `spawn_blocking`.
    pub fn with_conn<F, T>(&self, f: F) -> LoreResult<T>
    where
        F: FnOnce(&Connection) -> LoreResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let guard = self.connections[idx]
            .lock()
            .map_err(|e| to_storage_err(format!("read pool lock poisoned: {e}")))?;
        let _shared = self.gate.as_ref().map(WriteGate::shared).transpose()?;
        f(&guard)
    }

    /// Number of connections in the pool.
    pub fn size(&self) -> usize {
        self.connections.len()
    }
}
