//! SearchQuery → compiled select expressions.
//!
//! Compilation is pure: the same query, options, and conversation scope
//! always produce equal output.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lore_core::config::SearchConfig;
use lore_core::query::{
    DateRange, ScopeHint, SearchFilter, SearchQuery, SearchQueryExpr, SelectExpr, TextRange,
    WhenFilter,
};
use lore_core::traits::IConversationIndex;
use lore_core::LoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Scope hints are hard constraints. When false they are widened, and
    /// dropped when they would exclude every message.
    pub exact_scope: bool,
    /// Apply scope hints at all.
    pub apply_scope: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for CompileOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            exact_scope: config.exact_scope,
            apply_scope: config.apply_scope,
        }
    }
}

impl CompileOptions {
    pub fn relaxed(self) -> Self {
        Self {
            exact_scope: false,
            ..self
        }
    }
}

/// Conversation state the compiler resolves scope hints against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationScope {
    pub date_range: Option<DateRange>,
    pub message_count: u32,
}

impl ConversationScope {
    pub async fn of<I: IConversationIndex>(index: &I) -> LoreResult<Self> {
        Ok(Self {
            date_range: index.time_range().await?,
            message_count: index.message_count().await?,
        })
    }
}

/// One [`SearchQueryExpr`] per search expression, one [`SelectExpr`] per
/// filter, in translator order.
pub fn compile(
    query: &SearchQuery,
    options: &CompileOptions,
    scope: &ConversationScope,
) -> Vec<SearchQueryExpr> {
    query
        .search_expressions
        .iter()
        .map(|expr| SearchQueryExpr {
            select_expressions: expr
                .filters
                .iter()
                .map(|filter| compile_filter(filter, options, scope))
                .collect(),
            raw_query: Some(expr.rewritten_query.clone()),
        })
        .collect()
}

fn compile_filter(
    filter: &SearchFilter,
    options: &CompileOptions,
    scope: &ConversationScope,
) -> SelectExpr {
    let mut when = WhenFilter {
        knowledge_type: filter.knowledge_type,
        ..WhenFilter::default()
    };
    if options.apply_scope {
        if let Some(hint) = filter.scope.as_ref().filter(|h| !h.is_empty()) {
            apply_hint(&mut when, hint, options.exact_scope, scope);
        }
    }
    SelectExpr::new(filter.search_terms.clone()).with_when(when)
}

fn apply_hint(when: &mut WhenFilter, hint: &ScopeHint, exact: bool, scope: &ConversationScope) {
    if let Some(range) = hint.date_range {
        when.date_range = resolve_date(range, exact, scope.date_range);
    }
    if !hint.text_ranges.is_empty() {
        when.text_ranges_in_scope = resolve_ranges(&hint.text_ranges, exact, scope.message_count);
    }
}

fn resolve_date(
    range: DateRange,
    exact: bool,
    conversation: Option<DateRange>,
) -> Option<DateRange> {
    if range.is_degenerate() {
        warn!(start = %range.start, end = ?range.end, "degenerate date hint dropped");
        return None;
    }
    if exact {
        return Some(range);
    }
    let widened = range.widen_to_days();
    match conversation {
        Some(conversation) if !widened.overlaps(&conversation) => {
            warn!(start = %widened.start, "date hint outside conversation dropped");
            None
        }
        _ => Some(widened),
    }
}

fn resolve_ranges(ranges: &[TextRange], exact: bool, message_count: u32) -> Option<Vec<TextRange>> {
    if exact {
        return Some(ranges.to_vec());
    }
    let clamped: Vec<TextRange> = ranges
        .iter()
        .filter_map(|r| r.clamp_to(message_count))
        .collect();
    if clamped.is_empty() {
        debug!(message_count, "ordinal hint outside conversation dropped");
        None
    } else {
        Some(clamped)
    }
}
