//! Search options and results exchanged with the index and reported to
//! the presentation layer.

use serde::{Deserialize, Serialize};

use super::knowledge::SemanticRef;
use crate::query::{KnowledgeType, SearchQuery, SearchQueryExpr, SelectExpr};

/// Limits passed to the index on every search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub max_knowledge_matches: Option<usize>,
    pub max_message_matches: Option<usize>,
    /// Disable related-term expansion.
    pub exact_match: bool,
    /// Minimum score for a hit to be reported.
    pub threshold_score: Option<f32>,
}

/// Text-similarity (RAG) search limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RagOptions {
    pub threshold_score: f32,
    pub max_chars_in_budget: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredKnowledge {
    pub semantic_ref: SemanticRef,
    pub score: f32,
}

/// Knowledge hits for one select expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMatches {
    pub matches: Vec<ScoredKnowledge>,
    /// Search term texts that produced at least one hit.
    #[serde(default)]
    pub term_matches: Vec<String>,
}

impl KnowledgeMatches {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn of_type(&self, knowledge_type: KnowledgeType) -> impl Iterator<Item = &ScoredKnowledge> {
        self.matches
            .iter()
            .filter(move |m| m.semantic_ref.knowledge.knowledge_type() == knowledge_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredMessageOrdinal {
    pub message_ordinal: u32,
    pub score: f32,
}

/// Message hits for one select expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMatches {
    pub matches: Vec<ScoredMessageOrdinal>,
}

impl MessageMatches {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn ordinals(&self) -> Vec<u32> {
        self.matches.iter().map(|m| m.message_ordinal).collect()
    }
}

/// Knowledge and message matches for one select expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationSearchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_query: Option<String>,
    pub knowledge_matches: KnowledgeMatches,
    pub message_matches: MessageMatches,
}

impl ConversationSearchResult {
    /// A select expression counts as a match if either set is non-empty.
    pub fn has_matches(&self) -> bool {
        !self.knowledge_matches.is_empty() || !self.message_matches.is_empty()
    }
}

/// Outcome of one select expression within a pass. Compiler order is
/// preserved via the indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectResult {
    pub query_index: usize,
    pub select_index: usize,
    pub expr: SelectExpr,
    pub result: ConversationSearchResult,
    /// Set when execution failed; the expression then counts as zero matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SelectResult {
    pub fn counts_as_match(&self) -> bool {
        self.error.is_none() && self.result.has_matches()
    }
}

/// Which scope discipline a pass ran under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePass {
    Strict,
    Relaxed,
}

/// Caller options for a natural-language search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageSearchOptions {
    /// Treat scope hints as hard constraints on the first pass. `false`
    /// forces fuzzy scope from the start, which also disables relaxation.
    pub exact_scope: bool,
    /// Apply scope hints at all.
    pub apply_scope: bool,
    /// Prompt for relaxation consent instead of auto-consenting.
    pub interactive: bool,
    pub search: SearchOptions,
}

impl Default for LanguageSearchOptions {
    fn default() -> Self {
        Self {
            exact_scope: true,
            apply_scope: true,
            interactive: false,
            search: SearchOptions::default(),
        }
    }
}

/// Caller-supplied filters that override or augment compiled when filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageSearchFilter {
    pub knowledge_type: Option<KnowledgeType>,
    pub thread_description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Everything a natural-language search produced, for presentation and
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageSearchOutcome {
    pub query_text: String,
    pub query: SearchQuery,
    /// Compiled expressions of the final pass.
    pub compiled: Vec<SearchQueryExpr>,
    /// Select results of the final pass, in compiler order.
    pub results: Vec<SelectResult>,
    /// Every pass that ran, in order.
    pub passes: Vec<ScopePass>,
    pub relaxed: bool,
    pub count_select_matches: usize,
}

impl LanguageSearchOutcome {
    /// Per query expression: the merged results of its select expressions.
    pub fn results_for_query(&self, query_index: usize) -> impl Iterator<Item = &SelectResult> {
        self.results
            .iter()
            .filter(move |r| r.query_index == query_index)
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.results.iter().filter_map(|r| r.error.as_deref())
    }
}
