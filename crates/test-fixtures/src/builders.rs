//! Knowledge/message builders and JSON conversation fixtures.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use lore_core::models::{Action, ConcreteEntity, Facet, Knowledge};
use lore_core::query::{
    BooleanOp, PropertySearchTerm, SearchExpr, SearchFilter, SearchQuery, SearchTerm,
    SearchTermGroup, Term,
};

use crate::index::FixtureIndex;

/// Midnight UTC on the given day.
///
/// # Panics
/// Panics on an invalid date.
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"))
}

pub fn entity(name: &str, types: &[&str]) -> Knowledge {
    Knowledge::Entity(ConcreteEntity::new(name, types))
}

pub fn entity_with_facet(name: &str, types: &[&str], facet: &str, value: &str) -> Knowledge {
    let mut e = ConcreteEntity::new(name, types);
    e.facets.push(Facet {
        name: facet.to_string(),
        value: value.to_string(),
    });
    Knowledge::Entity(e)
}

pub fn action(subject: &str, verb: &str, object: &str) -> Knowledge {
    Knowledge::Action(Action {
        verbs: vec![verb.to_string()],
        subject: Some(subject.to_string()),
        object: Some(object.to_string()),
        indirect_object: None,
    })
}

pub fn topic(text: &str) -> Knowledge {
    Knowledge::Topic(text.to_string())
}

pub fn term(text: &str) -> Term {
    Term::Search(SearchTerm::new(text))
}

pub fn prop(name: &str, value: &str) -> Term {
    Term::Property(PropertySearchTerm::new(name, value))
}

/// A translator result with one expression per filter.
pub fn query_of(filters: Vec<SearchFilter>) -> SearchQuery {
    SearchQuery::new(
        filters
            .into_iter()
            .map(|f| SearchExpr::new(f.search_terms.to_string(), vec![f]))
            .collect(),
    )
}

pub fn or_filter(terms: Vec<Term>) -> SearchFilter {
    SearchFilter::new(SearchTermGroup::with_terms(BooleanOp::Or, terms))
}

pub fn and_filter(terms: Vec<Term>) -> SearchFilter {
    SearchFilter::new(SearchTermGroup::with_terms(BooleanOp::And, terms))
}

/// Alice is mentioned in December 2023; Bob buys a bike in March 2024.
/// Nothing is bought in January 2024.
pub fn alice_and_bob_index() -> FixtureIndex {
    FixtureIndex::new("alice-and-bob")
        .with_dated_message("Alice said hello to everyone.", utc(2023, 12, 15))
        .with_dated_message("Bob bought a bike for the spring.", utc(2024, 3, 10))
        .with_knowledge(0, entity("Alice", &["person"]))
        .with_knowledge(1, entity("Bob", &["person"]))
        .with_knowledge(1, action("Bob", "bought", "bike"))
}

/// JSON conversation fixture (`fixtures/conversations/*.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationFixture {
    pub name: String,
    pub messages: Vec<FixtureMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureMessage {
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub knowledge: Vec<Knowledge>,
}

impl ConversationFixture {
    pub fn load(relative_path: &str) -> Self {
        crate::load_fixture(relative_path)
    }

    pub fn into_index(self) -> FixtureIndex {
        let index = FixtureIndex::new(self.name);
        let mut pending = Vec::new();
        for m in self.messages {
            let mut message = lore_core::models::Message::new(0, m.text);
            message.timestamp = m.timestamp;
            message.speaker = m.speaker;
            message.tags = m.tags;
            let ordinal = index.push_message(message);
            pending.extend(m.knowledge.into_iter().map(|k| (ordinal, k)));
        }
        pending
            .into_iter()
            .fold(index, |index, (ordinal, k)| index.with_knowledge(ordinal, k))
    }
}
