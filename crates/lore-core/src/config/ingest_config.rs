use serde::{Deserialize, Serialize};

use super::defaults;

/// Knowledge ingestion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Message chunks per batch.
    pub batch_size: usize,
    /// Extraction calls in flight at once.
    pub concurrency: usize,
    /// Registry name of the extractor used when none is requested.
    pub default_extractor: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::DEFAULT_INGEST_BATCH_SIZE,
            concurrency: defaults::DEFAULT_INGEST_CONCURRENCY,
            default_extractor: defaults::DEFAULT_EXTRACTOR.to_string(),
        }
    }
}
