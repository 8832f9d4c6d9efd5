//! ConversationMemory: the searchable-memory capability for one
//! conversation index.

use std::sync::Arc;

use moka::sync::Cache;
use tracing::{debug, warn};

use lore_core::config::SearchConfig;
use lore_core::models::{LanguageSearchFilter, LanguageSearchOptions, LanguageSearchOutcome};
use lore_core::query::SearchQuery;
use lore_core::traits::{
    AutoConsent, CancellationToken, IConversationIndex, IQueryTranslator, IRelaxationConsent,
    ISearchableMemory, TranslationHints,
};
use lore_core::{LoreError, LoreResult};
use lore_frame::DataFrameCollection;
use lore_observability::SearchMetrics;

use crate::compiler::ConversationScope;
use crate::executor::AdaptiveExecutor;

pub struct ConversationMemory<I, T, C = AutoConsent> {
    name: String,
    index: Option<I>,
    translator: T,
    consent: C,
    frames: Option<DataFrameCollection>,
    config: SearchConfig,
    translations: Option<Cache<String, SearchQuery>>,
    metrics: Option<Arc<SearchMetrics>>,
    cancel: Option<CancellationToken>,
}

impl<I, T> ConversationMemory<I, T>
where
    I: IConversationIndex,
    T: IQueryTranslator,
{
    /// A memory with no conversation loaded yet.
    pub fn new(name: impl Into<String>, translator: T, config: &SearchConfig) -> Self {
        let translations = (config.translation_cache_capacity > 0)
            .then(|| Cache::new(config.translation_cache_capacity));
        Self {
            name: name.into(),
            index: None,
            translator,
            consent: AutoConsent,
            frames: None,
            config: config.clone(),
            translations,
            metrics: None,
            cancel: None,
        }
    }
}

impl<I, T, C> ConversationMemory<I, T, C>
where
    I: IConversationIndex,
    T: IQueryTranslator,
    C: IRelaxationConsent,
{
    pub fn with_index(mut self, index: I) -> Self {
        self.load(index);
        self
    }

    /// Replace the loaded conversation. Cached translations are dropped
    /// because they were resolved against the old conversation's dates.
    pub fn load(&mut self, index: I) {
        if let Some(cache) = &self.translations {
            cache.invalidate_all();
        }
        self.index = Some(index);
    }

    pub fn unload(&mut self) -> Option<I> {
        self.index.take()
    }

    /// Consent used by interactive searches.
    pub fn with_consent<C2: IRelaxationConsent>(self, consent: C2) -> ConversationMemory<I, T, C2> {
        ConversationMemory {
            name: self.name,
            index: self.index,
            translator: self.translator,
            consent,
            frames: self.frames,
            config: self.config,
            translations: self.translations,
            metrics: self.metrics,
            cancel: self.cancel,
        }
    }

    pub fn with_frames(mut self, frames: DataFrameCollection) -> Self {
        self.frames = Some(frames);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<SearchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn index(&self) -> LoreResult<&I> {
        self.index.as_ref().ok_or(LoreError::NoConversationLoaded)
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn consent(&self) -> &C {
        &self.consent
    }

    /// Fill unset search limits from the config.
    fn effective_options(&self, options: &LanguageSearchOptions) -> LanguageSearchOptions {
        let mut options = options.clone();
        let search = &mut options.search;
        search.max_knowledge_matches = search
            .max_knowledge_matches
            .or(Some(self.config.max_knowledge_matches));
        search.max_message_matches = search
            .max_message_matches
            .or(Some(self.config.max_message_matches));
        options
    }

    async fn translate(&self, text: &str, hints: &TranslationHints) -> LoreResult<SearchQuery> {
        let key = cache_key(text, hints)?;
        if let Some(cached) = self.translations.as_ref().and_then(|c| c.get(&key)) {
            debug!(text, "translation cache hit");
            if let Some(metrics) = &self.metrics {
                metrics.record_translation_cache_hit();
            }
            return Ok(cached);
        }
        let query = match self.translator.translate(text, hints).await {
            Ok(query) if query.is_empty() => Err(LoreError::TranslationFailure {
                reason: format!("no search expressions produced for '{text}'"),
            }),
            other => other,
        }
        .inspect_err(|e| {
            warn!(text, error = %e, "translation failed");
            if let Some(metrics) = &self.metrics {
                metrics.record_translation_failure();
            }
        })?;
        if let Some(cache) = &self.translations {
            cache.insert(key, query.clone());
        }
        Ok(query)
    }
}

fn cache_key(text: &str, hints: &TranslationHints) -> LoreResult<String> {
    Ok(format!("{text}\u{1f}{}", serde_json::to_string(hints)?))
}

impl<I, T, C> ISearchableMemory for ConversationMemory<I, T, C>
where
    I: IConversationIndex,
    T: IQueryTranslator,
    C: IRelaxationConsent,
{
    fn memory_name(&self) -> &str {
        &self.name
    }

    async fn search_query_from_language(
        &self,
        text: &str,
        hints: &TranslationHints,
    ) -> LoreResult<SearchQuery> {
        self.translate(text, hints).await
    }

    async fn search_with_language(
        &self,
        text: &str,
        options: &LanguageSearchOptions,
        filter: Option<&LanguageSearchFilter>,
    ) -> LoreResult<LanguageSearchOutcome> {
        let index = self.index()?;
        let scope = ConversationScope::of(index).await?;
        let hints = TranslationHints {
            conversation_range: scope.date_range,
            instructions: Vec::new(),
        };
        let query = self.translate(text, &hints).await?;

        AdaptiveExecutor::new(index)
            .with_config(&self.config)
            .with_frames(self.frames.as_ref())
            .with_metrics(self.metrics.clone())
            .with_cancellation(self.cancel.clone())
            .run(
                text,
                &query,
                &scope,
                &self.effective_options(options),
                filter,
                &self.consent,
            )
            .await
    }
}
