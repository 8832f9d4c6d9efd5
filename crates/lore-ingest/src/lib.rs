//! # lore-ingest
//!
//! Extracts knowledge from message chunks and adds it to a conversation
//! index, a bounded number of extraction calls at a time.

pub mod indexer;
pub mod registry;

pub use indexer::{index_messages, IngestFailure, IngestOptions, IngestReport, KnowledgeIndexer};
pub use registry::ExtractorRegistry;
