//! Span definitions per operation: search pass, select expression, answer,
//! ingestion batch.

/// Create a span for one executor pass.
#[macro_export]
macro_rules! search_pass_span {
    ($pass:expr, $expressions:expr) => {
        tracing::info_span!("lore.search.pass", pass = ?$pass, expressions = $expressions)
    };
}

/// Create a span for one select expression.
#[macro_export]
macro_rules! select_span {
    ($query_index:expr, $select_index:expr) => {
        tracing::debug_span!(
            "lore.search.select",
            query_index = $query_index,
            select_index = $select_index
        )
    };
}

/// Create a span for answer synthesis over one result.
#[macro_export]
macro_rules! answer_span {
    ($result_index:expr) => {
        tracing::info_span!("lore.answer", result_index = $result_index)
    };
}

/// Create a span for one ingestion batch.
#[macro_export]
macro_rules! ingest_span {
    ($batch:expr, $size:expr) => {
        tracing::info_span!("lore.ingest.batch", batch = $batch, size = $size)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SEARCH_PASS: &str = "lore.search.pass";
    pub const SELECT: &str = "lore.search.select";
    pub const ANSWER: &str = "lore.answer";
    pub const INGEST_BATCH: &str = "lore.ingest.batch";
}
