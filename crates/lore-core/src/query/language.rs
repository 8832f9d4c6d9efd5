//! Structured queries as produced by the natural-language translator,
//! before scope resolution.

use serde::{Deserialize, Serialize};

use super::group::SearchTermGroup;
use super::when::{DateRange, KnowledgeType, TextRange};

/// Positional/temporal scope the translator extracted from the question.
/// Resolved against the conversation by the query compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_ranges: Vec<TextRange>,
}

impl ScopeHint {
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.text_ranges.is_empty()
    }
}

/// One independent sub-search of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub search_terms: SearchTermGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_type: Option<KnowledgeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeHint>,
}

impl SearchFilter {
    pub fn new(search_terms: SearchTermGroup) -> Self {
        Self {
            search_terms,
            knowledge_type: None,
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: ScopeHint) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_knowledge_type(mut self, knowledge_type: KnowledgeType) -> Self {
        self.knowledge_type = Some(knowledge_type);
        self
    }
}

/// One structured rephrasing of the question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchExpr {
    pub rewritten_query: String,
    #[serde(default)]
    pub filters: Vec<SearchFilter>,
}

impl SearchExpr {
    pub fn new(rewritten_query: impl Into<String>, filters: Vec<SearchFilter>) -> Self {
        Self {
            rewritten_query: rewritten_query.into(),
            filters,
        }
    }
}

/// Everything the translator derived from one user utterance. Alternatives
/// are evaluated in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search_expressions: Vec<SearchExpr>,
}

impl SearchQuery {
    pub fn new(search_expressions: Vec<SearchExpr>) -> Self {
        Self { search_expressions }
    }

    pub fn is_empty(&self) -> bool {
        self.search_expressions.is_empty()
    }
}
