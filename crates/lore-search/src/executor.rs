//! AdaptiveExecutor: runs compiled select expressions and relaxes scope at
//! most once when the strict pass finds nothing.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info, warn, Instrument};

use lore_core::config::SearchConfig;
use lore_core::models::{
    ConversationSearchResult, LanguageSearchFilter, LanguageSearchOptions, LanguageSearchOutcome,
    MessageMatches, ScopePass, ScoredMessageOrdinal, SearchOptions, SelectResult,
};
use lore_core::query::{SearchQuery, SearchQueryExpr, SelectExpr, TextRange, WhenFilter};
use lore_core::traits::{Cancellable, CancellationToken, IConversationIndex, IRelaxationConsent};
use lore_core::{LoreError, LoreResult};
use lore_frame::DataFrameCollection;
use lore_observability::SearchMetrics;

use crate::compiler::{compile, CompileOptions, ConversationScope};

/// Executor states. Every search starts in `Strict` and ends in `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Strict,
    Executed(ScopePass),
    Relaxed,
    Done,
}

pub struct AdaptiveExecutor<'a, I: IConversationIndex> {
    index: &'a I,
    frames: Option<&'a DataFrameCollection>,
    metrics: Option<Arc<SearchMetrics>>,
    cancel: Option<CancellationToken>,
    select_timeout: Option<Duration>,
}

impl<'a, I: IConversationIndex> AdaptiveExecutor<'a, I> {
    pub fn new(index: &'a I) -> Self {
        Self {
            index,
            frames: None,
            metrics: None,
            cancel: None,
            select_timeout: None,
        }
    }

    pub fn with_config(mut self, config: &SearchConfig) -> Self {
        self.select_timeout = config.select_timeout_ms.map(Duration::from_millis);
        self
    }

    /// Resolve data frame property terms to message scope before searching.
    pub fn with_frames(mut self, frames: Option<&'a DataFrameCollection>) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<SearchMetrics>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_select_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.select_timeout = timeout;
        self
    }

    /// Compile and execute `query`, relaxing scope once if the strict pass
    /// matches nothing and `consent` agrees. Non-interactive searches
    /// consent automatically.
    pub async fn run<C: IRelaxationConsent>(
        &self,
        query_text: &str,
        query: &SearchQuery,
        scope: &ConversationScope,
        options: &LanguageSearchOptions,
        filter: Option<&LanguageSearchFilter>,
        consent: &C,
    ) -> LoreResult<LanguageSearchOutcome> {
        if let Some(metrics) = &self.metrics {
            metrics.record_query();
        }
        let compile_options = CompileOptions {
            exact_scope: options.exact_scope,
            apply_scope: options.apply_scope,
        };

        let mut state = SearchState::Strict;
        let mut passes = Vec::with_capacity(2);
        let mut compiled = Vec::new();
        let mut results = Vec::new();
        let mut count = 0;

        loop {
            state = match state {
                SearchState::Strict | SearchState::Relaxed => {
                    let first_strict = state == SearchState::Strict && options.exact_scope;
                    let (pass, pass_options) = if first_strict {
                        (ScopePass::Strict, compile_options)
                    } else {
                        (ScopePass::Relaxed, compile_options.relaxed())
                    };
                    compiled = compile(query, &pass_options, scope);
                    results = self.execute_pass(pass, &compiled, filter, &options.search).await?;
                    count = results.iter().filter(|r| r.counts_as_match()).count();
                    passes.push(pass);
                    SearchState::Executed(pass)
                }
                SearchState::Executed(ScopePass::Strict) if count == 0 => {
                    let consented = if options.interactive {
                        consent.consent_to_relax(query_text).await
                    } else {
                        true
                    };
                    if let Some(metrics) = &self.metrics {
                        metrics.record_relaxation(consented);
                    }
                    info!(consented, "strict pass found nothing");
                    if consented {
                        self.check_cancelled()?;
                        SearchState::Relaxed
                    } else {
                        SearchState::Done
                    }
                }
                SearchState::Executed(_) => SearchState::Done,
                SearchState::Done => break,
            };
        }

        Ok(LanguageSearchOutcome {
            query_text: query_text.to_string(),
            query: query.clone(),
            compiled,
            relaxed: passes.len() > 1,
            passes,
            results,
            count_select_matches: count,
        })
    }

    /// Run every select expression of `compiled` concurrently. Results keep
    /// compiler order. Per-select failures are recorded on the result;
    /// systemic failures abort the pass.
    pub async fn execute_pass(
        &self,
        pass: ScopePass,
        compiled: &[SearchQueryExpr],
        filter: Option<&LanguageSearchFilter>,
        options: &SearchOptions,
    ) -> LoreResult<Vec<SelectResult>> {
        let work: Vec<(usize, usize, SelectExpr, Option<&str>)> = compiled
            .iter()
            .enumerate()
            .flat_map(|(qi, q)| {
                q.select_expressions
                    .iter()
                    .enumerate()
                    .map(move |(si, s)| (qi, si, bind_filter(s, filter), q.raw_query.as_deref()))
            })
            .collect();
        let expressions = work.len();

        let span = lore_observability::search_pass_span!(pass, expressions);
        let outcomes = join_all(
            work.into_iter()
                .map(|(qi, si, expr, raw)| self.run_select(qi, si, expr, raw, options)),
        )
        .instrument(span)
        .await;

        let results = outcomes.into_iter().collect::<LoreResult<Vec<_>>>()?;
        let matched = results.iter().filter(|r| r.counts_as_match()).count();
        if let Some(metrics) = &self.metrics {
            metrics.record_pass(expressions as u64, matched as u64);
        }
        info!(pass = ?pass, expressions, matched, "search pass complete");
        Ok(results)
    }

    async fn run_select(
        &self,
        query_index: usize,
        select_index: usize,
        expr: SelectExpr,
        raw_query: Option<&str>,
        options: &SearchOptions,
    ) -> LoreResult<SelectResult> {
        self.check_cancelled()?;
        let span = lore_observability::select_span!(query_index, select_index);
        let outcome = async {
            match self.select_timeout {
                Some(limit) => tokio::time::timeout(limit, self.search_select(&expr, options))
                    .await
                    .unwrap_or_else(|_| {
                        Err(LoreError::Timeout {
                            operation: format!("select {}", expr.describe()),
                            millis: limit.as_millis() as u64,
                        })
                    }),
                None => self.search_select(&expr, options).await,
            }
        }
        .instrument(span)
        .await;

        let (result, error) = match outcome {
            Ok(mut result) => {
                result.raw_query = raw_query.map(str::to_string);
                (result, None)
            }
            Err(e) if e.is_systemic() => return Err(e),
            Err(e) => {
                warn!(query_index, select_index, error = %e, "select expression failed");
                if let Some(metrics) = &self.metrics {
                    metrics.record_execution_error();
                }
                (ConversationSearchResult::default(), Some(e.to_string()))
            }
        };
        Ok(SelectResult {
            query_index,
            select_index,
            expr,
            result,
            error,
        })
    }

    async fn search_select(
        &self,
        expr: &SelectExpr,
        options: &SearchOptions,
    ) -> LoreResult<ConversationSearchResult> {
        let mut group = expr.search_term_group.clone();
        let mut when = expr.when.clone();

        if let Some(frames) = self.frames {
            let scope = frames.scope_for_group(&group).await?;
            if let Some(ranges) = scope.text_ranges {
                let bound = when.get_or_insert_with(WhenFilter::default);
                let ranges: Vec<_> = match &bound.text_ranges_in_scope {
                    Some(existing) => ranges
                        .into_iter()
                        .filter(|r| {
                            existing
                                .iter()
                                .any(|e| e.contains_message(r.start.message_ordinal))
                        })
                        .collect(),
                    None => ranges,
                };
                bound.text_ranges_in_scope = Some(ranges);
                if scope.remaining.is_empty() {
                    // Frame terms were the whole query.
                    return self.frame_matches(bound).await;
                }
                group = scope.remaining;
            }
        }

        let (knowledge, messages) = tokio::join!(
            self.index.search_knowledge(&group, when.as_ref(), options),
            self.index.search_messages(&group, when.as_ref(), options),
        );
        Ok(ConversationSearchResult {
            raw_query: None,
            knowledge_matches: knowledge?,
            message_matches: messages?,
        })
    }

    /// Messages named by the frame ranges that the rest of the when filter
    /// still admits, each scored 1.0.
    async fn frame_matches(&self, when: &WhenFilter) -> LoreResult<ConversationSearchResult> {
        let ordinals: BTreeSet<u32> = when
            .text_ranges_in_scope
            .iter()
            .flatten()
            .flat_map(TextRange::message_ordinals)
            .collect();
        if ordinals.is_empty() {
            return Ok(ConversationSearchResult::default());
        }
        let ordinals: Vec<u32> = ordinals.into_iter().collect();
        let messages = self.index.get_messages(&ordinals).await?;
        let matches: Vec<ScoredMessageOrdinal> = messages
            .iter()
            .filter(|m| when.admits_message(m))
            .map(|m| ScoredMessageOrdinal {
                message_ordinal: m.ordinal,
                score: 1.0,
            })
            .collect();
        debug!(
            candidates = ordinals.len(),
            admitted = matches.len(),
            "frame-only select"
        );
        Ok(ConversationSearchResult {
            message_matches: MessageMatches { matches },
            ..ConversationSearchResult::default()
        })
    }

    fn check_cancelled(&self) -> LoreResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(LoreError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Caller-supplied filters override the compiled when filter field by field.
fn bind_filter(expr: &SelectExpr, filter: Option<&LanguageSearchFilter>) -> SelectExpr {
    let Some(filter) = filter else {
        return expr.clone();
    };
    let mut when = expr.when.clone().unwrap_or_default();
    if filter.knowledge_type.is_some() {
        when.knowledge_type = filter.knowledge_type;
    }
    if filter.thread_description.is_some() {
        when.thread_description = filter.thread_description.clone();
    }
    if filter.tags.is_some() {
        when.tags = filter.tags.clone();
    }
    SelectExpr::new(expr.search_term_group.clone()).with_when(when)
}
