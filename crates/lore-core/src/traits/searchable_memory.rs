//! The capability every memory kind exposes to a shell.

use crate::errors::LoreResult;
use crate::models::{LanguageSearchFilter, LanguageSearchOptions, LanguageSearchOutcome};
use crate::query::SearchQuery;
use crate::traits::TranslationHints;

/// Natural-language search over some kind of memory (conversation,
/// website history, image collection, ...).
///
/// Shells dispatch through this trait instead of inspecting the concrete
/// memory type.
#[allow(async_fn_in_trait)]
pub trait ISearchableMemory: Send + Sync {
    fn memory_name(&self) -> &str;

    /// Translate a question into a structured query without executing it.
    async fn search_query_from_language(
        &self,
        text: &str,
        hints: &TranslationHints,
    ) -> LoreResult<SearchQuery>;

    /// Translate, compile, and execute with scope relaxation.
    async fn search_with_language(
        &self,
        text: &str,
        options: &LanguageSearchOptions,
        filter: Option<&LanguageSearchFilter>,
    ) -> LoreResult<LanguageSearchOutcome>;
}
