//! # lore-observability
//!
//! Structured tracing setup with span definitions, and lock-free counters
//! for the search, answer, and ingestion pipelines.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{AnswerMetrics, IngestMetrics, MetricsCollector, SearchMetrics};
pub use tracing_setup::{
    init_from_config, init_tracing, init_tracing_json, init_tracing_with_filter,
};
