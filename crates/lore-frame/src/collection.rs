//! A named set of data frames that can narrow a term group's scope.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use lore_core::query::{BooleanOp, PropertySearchTerm, SearchTermGroup, Term, TextRange};
use lore_core::LoreResult;

use crate::table::DataFrameTable;

/// What the frames contributed to one term group.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScope {
    /// The group with every frame-resolved term removed.
    pub remaining: SearchTermGroup,
    /// Messages the frame terms matched, one range per message, ascending.
    /// `None` when no term was resolved by a frame.
    pub text_ranges: Option<Vec<TextRange>>,
}

impl FrameScope {
    fn untouched(group: &SearchTermGroup) -> Self {
        Self {
            remaining: group.clone(),
            text_ranges: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct DataFrameCollection {
    frames: BTreeMap<String, DataFrameTable>,
}

impl DataFrameCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: DataFrameTable) {
        self.frames.insert(table.name().to_string(), table);
    }

    pub fn with(mut self, table: DataFrameTable) -> Self {
        self.insert(table);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DataFrameTable> {
        self.frames.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Resolve the top-level property terms of an `and` group that name a
    /// frame column. Each term goes to the first frame (by name) that has the
    /// column; each frame's terms are ANDed and run through `find_sources`,
    /// and the matched message ordinals are intersected across frames.
    ///
    /// Other groups are returned untouched: under `or` a frame term cannot
    /// narrow the scope of its siblings.
    pub async fn scope_for_group(&self, group: &SearchTermGroup) -> LoreResult<FrameScope> {
        if group.boolean_op != BooleanOp::And || self.frames.is_empty() {
            return Ok(FrameScope::untouched(group));
        }

        let mut per_frame: BTreeMap<&str, Vec<PropertySearchTerm>> = BTreeMap::new();
        let mut remaining = SearchTermGroup::new(BooleanOp::And);
        for term in &group.terms {
            let owner = match term {
                Term::Property(p) => self
                    .frames
                    .iter()
                    .find(|(_, t)| t.schema().contains(&p.property_name))
                    .map(|(name, _)| name.as_str()),
                _ => None,
            };
            match (owner, term) {
                (Some(name), Term::Property(p)) => {
                    per_frame.entry(name).or_default().push(p.clone())
                }
                _ => remaining.push(term.clone()),
            }
        }
        if per_frame.is_empty() {
            return Ok(FrameScope::untouched(group));
        }

        let mut matched: Option<BTreeSet<u32>> = None;
        for (name, terms) in per_frame {
            let frame_group = SearchTermGroup::and(terms.into_iter().map(Term::Property));
            let mut ordinals = BTreeSet::new();
            if let Some(table) = self.frames.get(name) {
                for source in table.find_sources(&frame_group).await? {
                    ordinals.extend(source.range.message_ordinals());
                }
            }
            debug!(frame = name, messages = ordinals.len(), "frame scope resolved");
            matched = Some(match matched {
                None => ordinals,
                Some(acc) => acc.intersection(&ordinals).copied().collect(),
            });
        }

        Ok(FrameScope {
            remaining,
            text_ranges: Some(
                matched
                    .unwrap_or_default()
                    .into_iter()
                    .map(TextRange::message)
                    .collect(),
            ),
        })
    }
}
