use serde::{Deserialize, Serialize};

use crate::errors::LoreResult;
use crate::query::{DateRange, SearchQuery};

/// Context passed to the natural-language translator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationHints {
    /// Date range the conversation spans, so relative dates can be resolved.
    pub conversation_range: Option<DateRange>,
    /// Extra model instructions.
    pub instructions: Vec<String>,
}

/// Natural language → structured search query. A black box to lore.
#[allow(async_fn_in_trait)]
pub trait IQueryTranslator: Send + Sync {
    async fn translate(&self, text: &str, hints: &TranslationHints) -> LoreResult<SearchQuery>;
}
