//! Extracted knowledge: entities, actions, topics, tags.

use serde::{Deserialize, Serialize};

use crate::query::{KnowledgeType, TextRange};

/// A name/value facet on an entity. Composite values (amount + unit) are
/// carried as rendered text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteEntity {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub facets: Vec<Facet>,
}

impl ConcreteEntity {
    pub fn new(name: impl Into<String>, types: &[&str]) -> Self {
        Self {
            name: name.into(),
            types: types.iter().map(|t| t.to_string()).collect(),
            facets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub verbs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect_object: Option<String>,
}

/// One piece of extracted knowledge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Knowledge {
    Entity(ConcreteEntity),
    Action(Action),
    Topic(String),
    Tag(String),
}

impl Knowledge {
    pub fn knowledge_type(&self) -> KnowledgeType {
        match self {
            Knowledge::Entity(_) => KnowledgeType::Entity,
            Knowledge::Action(_) => KnowledgeType::Action,
            Knowledge::Topic(_) => KnowledgeType::Topic,
            Knowledge::Tag(_) => KnowledgeType::Tag,
        }
    }

    /// One-line rendering used as answer evidence.
    pub fn to_evidence_text(&self) -> String {
        match self {
            Knowledge::Entity(e) => {
                let mut text = e.name.clone();
                if !e.types.is_empty() {
                    text.push_str(&format!(" ({})", e.types.join(", ")));
                }
                for facet in &e.facets {
                    text.push_str(&format!("; {}: {}", facet.name, facet.value));
                }
                text
            }
            Knowledge::Action(a) => {
                let mut parts = Vec::with_capacity(4);
                if let Some(s) = &a.subject {
                    parts.push(s.clone());
                }
                parts.push(a.verbs.join(" "));
                if let Some(o) = &a.object {
                    parts.push(o.clone());
                }
                if let Some(io) = &a.indirect_object {
                    parts.push(format!("to {io}"));
                }
                parts.join(" ")
            }
            Knowledge::Topic(t) => format!("topic: {t}"),
            Knowledge::Tag(t) => format!("tag: {t}"),
        }
    }
}

/// A knowledge item anchored to the text range it was extracted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticRef {
    pub semantic_ref_ordinal: u32,
    pub range: TextRange,
    pub knowledge: Knowledge,
}

/// Knowledge extracted from one chunk of a message during ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeResponse {
    #[serde(default)]
    pub entities: Vec<ConcreteEntity>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl KnowledgeResponse {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.actions.is_empty() && self.topics.is_empty()
    }

    /// Flatten into individual knowledge items, entities first.
    pub fn into_knowledge(self) -> Vec<Knowledge> {
        self.entities
            .into_iter()
            .map(Knowledge::Entity)
            .chain(self.actions.into_iter().map(Knowledge::Action))
            .chain(self.topics.into_iter().map(Knowledge::Topic))
            .collect()
    }
}
