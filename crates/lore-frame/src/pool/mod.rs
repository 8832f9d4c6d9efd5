//! Connection pool: one serialized writer plus a pool of readers.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rusqlite::Connection;

use lore_core::config::FrameConfig;
use lore_core::LoreResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

use crate::to_storage_err;

/// Keeps in-memory readers out of the writer's transactions. Shared-cache
/// databases have no WAL snapshots, so a read waits until no write is in
/// progress. File-backed pools have no gate.
#[derive(Clone, Default)]
pub struct WriteGate(Arc<RwLock<()>>);

impl WriteGate {
    pub fn shared(&self) -> LoreResult<RwLockReadGuard<'_, ()>> {
        self.0
            .read()
            .map_err(|e| to_storage_err(format!("write gate poisoned: {e}")))
    }

    pub fn exclusive(&self) -> LoreResult<RwLockWriteGuard<'_, ()>> {
        self.0
            .write()
            .map_err(|e| to_storage_err(format!("write gate poisoned: {e}")))
    }
}

/// Manages the single write connection and the read connection pool.
/// Both halves are `Arc` so tables and cursors can share them.
pub struct ConnectionPool {
    pub writer: Arc<WriteConnection>,
    pub readers: Arc<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    /// The writer opens first so the file exists before readers attach.
    pub fn open(path: &Path, config: &FrameConfig) -> LoreResult<Self> {
        let writer = WriteConnection::open(path, config.busy_timeout_ms)?;
        let readers = ReadPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        Ok(Self {
            writer: Arc::new(writer),
            readers: Arc::new(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool. Every connection attaches to the same private
    /// shared-cache database, so readers see the writer's commits and
    /// nothing before them.
    pub fn open_in_memory(config: &FrameConfig) -> LoreResult<Self> {
        let uri = format!("file:lore-frames-{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
        let gate = WriteGate::default();
        let writer = WriteConnection::open_uri(&uri, config.busy_timeout_ms, gate.clone())?;
        let readers =
            ReadPool::open_uri(&uri, config.read_pool_size, config.busy_timeout_ms, gate)?;
        Ok(Self {
            writer: Arc::new(writer),
            readers: Arc::new(readers),
            db_path: None,
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.is_none()
    }

    /// Run a read on the pool without blocking the async runtime.
    pub async fn read<F, T>(&self, f: F) -> LoreResult<T>
    where
        F: FnOnce(&Connection) -> LoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let readers = Arc::clone(&self.readers);
        tokio::task::spawn_blocking(move || readers.with_conn(f))
            .await
            .map_err(|e| to_storage_err(format!("read task failed: {e}")))?
    }
}
