//! Compiled, executable query expressions.

use serde::{Deserialize, Serialize};

use super::group::SearchTermGroup;
use super::when::WhenFilter;
use crate::errors::LoreResult;

/// One executable (term group, when filter) pair. The atomic unit of execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectExpr {
    pub search_term_group: SearchTermGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<WhenFilter>,
}

impl SelectExpr {
    pub fn new(search_term_group: SearchTermGroup) -> Self {
        Self {
            search_term_group,
            when: None,
        }
    }

    pub fn with_when(mut self, when: WhenFilter) -> Self {
        self.when = if when.is_empty() { None } else { Some(when) };
        self
    }

    /// Short description for logs and error reports.
    pub fn describe(&self) -> String {
        self.search_term_group.to_string()
    }
}

/// The select expressions compiled from one natural-language query, plus
/// the raw text for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQueryExpr {
    pub select_expressions: Vec<SelectExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_query: Option<String>,
}

impl SearchQueryExpr {
    /// Stable content hash (blake3 over the JSON form), usable as a cache key.
    pub fn fingerprint(&self) -> LoreResult<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}
