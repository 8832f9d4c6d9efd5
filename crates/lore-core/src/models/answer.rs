//! Answer generation requests, streamed chunks, and synthesized answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::KnowledgeType;

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceSource {
    Knowledge {
        knowledge_type: KnowledgeType,
        semantic_ref_ordinal: u32,
    },
    Message {
        message_ordinal: u32,
    },
}

/// One unit of evidence handed to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub source: EvidenceSource,
    pub text: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EvidenceItem {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_message(&self) -> bool {
        matches!(self.source, EvidenceSource::Message { .. })
    }
}

/// One generation call: the question plus a budget-bounded evidence chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question: String,
    pub evidence: Vec<EvidenceItem>,
    pub chunk_index: usize,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    Answered,
    NoAnswer,
}

/// What the generator returned for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub kind: AnswerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_no_answer: Option<String>,
}

impl AnswerResponse {
    pub fn answered(text: impl Into<String>) -> Self {
        Self {
            kind: AnswerKind::Answered,
            answer: Some(text.into()),
            why_no_answer: None,
        }
    }

    pub fn no_answer(why: impl Into<String>) -> Self {
        Self {
            kind: AnswerKind::NoAnswer,
            answer: None,
            why_no_answer: Some(why.into()),
        }
    }
}

/// A partial response chunk, tagged with the result and evidence chunk it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerChunk {
    pub result_index: usize,
    pub chunk_index: usize,
    pub text: String,
}

/// How one search result fed into the answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultAnswerReport {
    pub result_index: usize,
    /// The evidence came from text-similarity search, not structured matches.
    pub used_fallback: bool,
    pub knowledge_items: usize,
    pub message_items: usize,
    /// Message evidence was skipped because knowledge sufficed.
    pub messages_skipped: bool,
    pub evidence_chars: usize,
    /// Evidence items dropped to honor the character budget.
    pub dropped_items: usize,
    pub chunks_generated: usize,
}

/// The merged answer across all results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedAnswer {
    pub kind: AnswerKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_no_answer: Option<String>,
    pub reports: Vec<ResultAnswerReport>,
}

impl SynthesizedAnswer {
    pub fn used_fallback(&self) -> bool {
        self.reports.iter().any(|r| r.used_fallback)
    }
}
