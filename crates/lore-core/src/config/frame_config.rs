use serde::{Deserialize, Serialize};

use super::defaults;

/// Data frame store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Path to the SQLite file. `None` keeps frames in memory.
    pub db_path: Option<String>,
    /// Number of read connections in the pool.
    pub read_pool_size: usize,
    /// Rows fetched per page by a row cursor.
    pub cursor_page_size: usize,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            read_pool_size: defaults::DEFAULT_FRAME_READ_POOL_SIZE,
            cursor_page_size: defaults::DEFAULT_CURSOR_PAGE_SIZE,
            busy_timeout_ms: defaults::DEFAULT_FRAME_BUSY_TIMEOUT_MS,
        }
    }
}
