//! Central metrics registry.
//!
//! Counters are atomics behind `Arc`, so one collector can be shared by
//! concurrently running select expressions and ingestion tasks.

pub mod answer_metrics;
pub mod ingest_metrics;
pub mod search_metrics;

use std::sync::Arc;

use serde::Serialize;

pub use answer_metrics::{AnswerMetrics, AnswerMetricsSnapshot};
pub use ingest_metrics::{IngestMetrics, IngestMetricsSnapshot};
pub use search_metrics::{SearchMetrics, SearchMetricsSnapshot};

/// Owns the per-pipeline collectors.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    pub search: Arc<SearchMetrics>,
    pub answer: Arc<AnswerMetrics>,
    pub ingest: Arc<IngestMetrics>,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub search: SearchMetricsSnapshot,
    pub answer: AnswerMetricsSnapshot,
    pub ingest: IngestMetricsSnapshot,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            search: self.search.snapshot(),
            answer: self.answer.snapshot(),
            ingest: self.ingest.snapshot(),
        }
    }

    /// Reset all counters (useful for testing or periodic rotation).
    pub fn reset(&self) {
        self.search.reset();
        self.answer.reset();
        self.ingest.reset();
    }
}
