//! Boolean term groups.
//!
//! An empty group contributes no constraint when merged and matches nothing
//! when evaluated on its own. It never means "match everything".

use std::fmt;

use serde::{Deserialize, Serialize};

use super::term::{PropertySearchTerm, SearchTerm};

/// How the children of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    And,
    Or,
    /// Union that keeps only the hits matched by the most terms.
    OrMax,
}

impl BooleanOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::OrMax => "or_max",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One child of a [`SearchTermGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Term {
    Search(SearchTerm),
    Property(PropertySearchTerm),
    Group(SearchTermGroup),
}

impl Term {
    /// Order-insensitive canonical key; equal keys mean equivalent terms.
    pub fn canonical_key(&self) -> String {
        match self {
            Term::Search(t) => format!("t:{:?}", t.text.to_ascii_lowercase()),
            Term::Property(p) => format!(
                "p:{:?}{}{:?}",
                p.property_name.to_ascii_lowercase(),
                p.op().symbol(),
                p.property_value.text.to_ascii_lowercase()
            ),
            Term::Group(g) => g.canonical_key(),
        }
    }
}

impl From<SearchTerm> for Term {
    fn from(term: SearchTerm) -> Self {
        Term::Search(term)
    }
}

impl From<PropertySearchTerm> for Term {
    fn from(term: PropertySearchTerm) -> Self {
        Term::Property(term)
    }
}

impl From<SearchTermGroup> for Term {
    fn from(group: SearchTermGroup) -> Self {
        Term::Group(group)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Search(t) => write!(f, "{t}"),
            Term::Property(p) => write!(f, "{p}"),
            Term::Group(g) => write!(f, "{g}"),
        }
    }
}

/// An ordered set of terms combined with one boolean operator.
/// Groups nest arbitrarily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTermGroup {
    pub boolean_op: BooleanOp,
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl SearchTermGroup {
    pub fn new(boolean_op: BooleanOp) -> Self {
        Self {
            boolean_op,
            terms: Vec::new(),
        }
    }

    pub fn and<I: IntoIterator<Item = Term>>(terms: I) -> Self {
        Self::with_terms(BooleanOp::And, terms)
    }

    pub fn or<I: IntoIterator<Item = Term>>(terms: I) -> Self {
        Self::with_terms(BooleanOp::Or, terms)
    }

    pub fn or_max<I: IntoIterator<Item = Term>>(terms: I) -> Self {
        Self::with_terms(BooleanOp::OrMax, terms)
    }

    pub fn with_terms<I: IntoIterator<Item = Term>>(boolean_op: BooleanOp, terms: I) -> Self {
        Self {
            boolean_op,
            terms: terms.into_iter().collect(),
        }
    }

    pub fn push(&mut self, term: impl Into<Term>) {
        self.terms.push(term.into());
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Merge two groups under `op`.
    ///
    /// An operand whose operator equals `op` has its children spliced in;
    /// any other operand is nested intact so its semantics survive. Empty
    /// operands add no constraint and are dropped.
    pub fn merge(left: SearchTermGroup, right: SearchTermGroup, op: BooleanOp) -> SearchTermGroup {
        let mut merged = SearchTermGroup::new(op);
        for operand in [left, right] {
            if operand.is_empty() {
                continue;
            }
            if operand.boolean_op == op {
                merged.terms.extend(operand.terms);
            } else {
                merged.terms.push(Term::Group(operand));
            }
        }
        merged
    }

    /// Ordering-insensitive equivalence: same operator and the same multiset
    /// of (recursively equivalent) children.
    pub fn is_equivalent(&self, other: &SearchTermGroup) -> bool {
        self.canonical_key() == other.canonical_key()
    }

    /// Canonical key with children sorted, so insertion order is irrelevant
    /// but duplicate children still count.
    pub fn canonical_key(&self) -> String {
        let mut keys: Vec<String> = self.terms.iter().map(Term::canonical_key).collect();
        keys.sort_unstable();
        format!("g:{}({})", self.boolean_op, keys.join(","))
    }

    /// Top-level property terms, in order.
    pub fn property_terms(&self) -> impl Iterator<Item = &PropertySearchTerm> {
        self.terms.iter().filter_map(|t| match t {
            Term::Property(p) => Some(p),
            _ => None,
        })
    }

    /// Every search term in the tree, including property values, depth-first.
    pub fn all_search_terms(&self) -> Vec<&SearchTerm> {
        let mut out = Vec::new();
        collect_search_terms(self, &mut out);
        out
    }
}

fn collect_search_terms<'a>(group: &'a SearchTermGroup, out: &mut Vec<&'a SearchTerm>) {
    for term in &group.terms {
        match term {
            Term::Search(t) => out.push(t),
            Term::Property(p) => out.push(&p.property_value),
            Term::Group(g) => collect_search_terms(g, out),
        }
    }
}

impl fmt::Display for SearchTermGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = match self.boolean_op {
            BooleanOp::And => " AND ",
            BooleanOp::Or => " OR ",
            BooleanOp::OrMax => " OR_MAX ",
        };
        f.write_str("(")?;
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            write!(f, "{term}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> Term {
        Term::Search(SearchTerm::new(text))
    }

    #[test]
    fn display_nests_groups() {
        let inner = SearchTermGroup::or([t("a"), t("b")]);
        let outer = SearchTermGroup::and([t("c"), Term::Group(inner)]);
        assert_eq!(outer.to_string(), "(c AND (a OR b))");
    }

    #[test]
    fn canonical_key_counts_duplicates() {
        let once = SearchTermGroup::or([t("a")]);
        let twice = SearchTermGroup::or([t("a"), t("a")]);
        assert!(!once.is_equivalent(&twice));
    }
}
