use serde::{Deserialize, Serialize};

use super::defaults;

/// Query compiler and adaptive executor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Treat scope hints as hard constraints on the first pass.
    pub exact_scope: bool,
    /// Apply scope hints at all.
    pub apply_scope: bool,
    pub max_knowledge_matches: usize,
    pub max_message_matches: usize,
    /// Per-select-expression timeout. `None` disables it.
    pub select_timeout_ms: Option<u64>,
    /// Entries in the translation cache; 0 disables caching.
    pub translation_cache_capacity: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exact_scope: defaults::DEFAULT_EXACT_SCOPE,
            apply_scope: defaults::DEFAULT_APPLY_SCOPE,
            max_knowledge_matches: defaults::DEFAULT_MAX_KNOWLEDGE_MATCHES,
            max_message_matches: defaults::DEFAULT_MAX_MESSAGE_MATCHES,
            select_timeout_ms: None,
            translation_cache_capacity: defaults::DEFAULT_TRANSLATION_CACHE_CAPACITY,
        }
    }
}
