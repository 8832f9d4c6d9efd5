//! Ingestion counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct IngestMetrics {
    batches: AtomicU64,
    chunks_indexed: AtomicU64,
    extraction_failures: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestMetricsSnapshot {
    pub batches: u64,
    pub chunks_indexed: u64,
    pub extraction_failures: u64,
}

impl IngestMetrics {
    pub fn record_batch(&self, indexed: u64, failed: u64) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.chunks_indexed.fetch_add(indexed, Ordering::Relaxed);
        self.extraction_failures.fetch_add(failed, Ordering::Relaxed);
    }

    /// Fraction of attempted chunks that failed extraction.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.extraction_failures.load(Ordering::Relaxed);
        let total = failed + self.chunks_indexed.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        failed as f64 / total as f64
    }

    pub fn snapshot(&self) -> IngestMetricsSnapshot {
        IngestMetricsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.batches.store(0, Ordering::Relaxed);
        self.chunks_indexed.store(0, Ordering::Relaxed);
        self.extraction_failures.store(0, Ordering::Relaxed);
    }
}
