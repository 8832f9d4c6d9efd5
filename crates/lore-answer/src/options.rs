use serde::{Deserialize, Serialize};

use lore_core::config::AnswerConfig;

/// Per-call answer settings. Defaults come from [`AnswerConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOptions {
    /// Include message text as evidence. When false, answers rest on
    /// knowledge matches alone.
    pub include_messages: bool,
    /// Skip message evidence for results that have knowledge matches, and
    /// stop after the first answered generation call.
    pub fast_stop: bool,
    /// Substitute a text-similarity search for results with no match.
    pub fallback: bool,
    /// Spread over-budget evidence across several generation calls.
    pub chunking: bool,
    pub max_chunks: usize,
    pub max_chars_in_budget: usize,
    pub rag_threshold: f32,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self::from(&AnswerConfig::default())
    }
}

impl From<&AnswerConfig> for AnswerOptions {
    fn from(config: &AnswerConfig) -> Self {
        Self {
            include_messages: config.include_messages,
            fast_stop: config.fast_stop,
            fallback: config.fallback,
            chunking: config.chunking,
            max_chunks: config.max_chunks.max(1),
            max_chars_in_budget: config.max_chars_in_budget,
            rag_threshold: config.rag_threshold,
        }
    }
}
