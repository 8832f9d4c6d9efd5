use serde::{Deserialize, Serialize};

use super::defaults;

/// Answer synthesizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Characters of evidence per generation call.
    pub max_chars_in_budget: usize,
    /// Skip message evidence when knowledge suffices; stop after the first answer.
    pub fast_stop: bool,
    /// Substitute text-similarity search when a result has no structured match.
    pub fallback: bool,
    pub include_messages: bool,
    /// Split over-budget evidence into several generation calls instead of dropping it.
    pub chunking: bool,
    pub max_chunks: usize,
    /// Minimum similarity score for fallback hits.
    pub rag_threshold: f32,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_chars_in_budget: defaults::DEFAULT_MAX_CHARS_IN_BUDGET,
            fast_stop: defaults::DEFAULT_FAST_STOP,
            fallback: defaults::DEFAULT_FALLBACK,
            include_messages: defaults::DEFAULT_INCLUDE_MESSAGES,
            chunking: defaults::DEFAULT_CHUNKING,
            max_chunks: defaults::DEFAULT_MAX_CHUNKS,
            rag_threshold: defaults::DEFAULT_RAG_THRESHOLD,
        }
    }
}
