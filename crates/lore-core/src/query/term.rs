use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A free-text search token with optional synonym expansion.
///
/// Equality and hashing are case-insensitive on `text` only; related terms
/// widen recall but do not change identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTerm {
    pub text: String,
    /// Related terms (synonyms, expansions). `None` means "not yet resolved",
    /// `Some(vec![])` means "resolved, nothing related".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_terms: Option<Vec<SearchTerm>>,
    /// Optional match weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

impl SearchTerm {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            related_terms: None,
            weight: None,
        }
    }

    /// Attach related terms.
    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_terms = Some(related.into_iter().map(SearchTerm::new).collect());
        self
    }

    /// Does `candidate` match this term or any of its related terms?
    pub fn matches_text(&self, candidate: &str) -> bool {
        if self.text.eq_ignore_ascii_case(candidate) {
            return true;
        }
        self.related_terms
            .iter()
            .flatten()
            .any(|r| r.text.eq_ignore_ascii_case(candidate))
    }

    /// The term text followed by each related term, in declaration order.
    pub fn alternatives(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.text.as_str())
            .chain(self.related_terms.iter().flatten().map(|r| r.text.as_str()))
    }
}

impl PartialEq for SearchTerm {
    fn eq(&self, other: &Self) -> bool {
        self.text.eq_ignore_ascii_case(&other.text)
    }
}

impl Eq for SearchTerm {}

impl Hash for SearchTerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for SearchTerm {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Relational comparison. Each operator maps to one fixed predicate fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl ComparisonOp {
    /// The SQL operator fragment. Never built from user input.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// The operator as written in queries.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A (property, value) pair matched against structured facets such as verb,
/// subject, entity name, or a data frame column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertySearchTerm {
    pub property_name: String,
    pub property_value: SearchTerm,
    /// Defaults to equality when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_op: Option<ComparisonOp>,
}

impl PropertySearchTerm {
    pub fn new(property_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            property_value: SearchTerm::new(value),
            compare_op: None,
        }
    }

    pub fn with_op(mut self, op: ComparisonOp) -> Self {
        self.compare_op = Some(op);
        self
    }

    /// The effective comparison operator.
    pub fn op(&self) -> ComparisonOp {
        self.compare_op.unwrap_or_default()
    }
}

impl fmt::Display for PropertySearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op() {
            ComparisonOp::Eq => write!(f, "{}:{}", self.property_name, self.property_value),
            op => write!(f, "{} {op} {}", self.property_name, self.property_value),
        }
    }
}
