//! Data exchanged with collaborators and reported to callers.

pub mod answer;
pub mod knowledge;
pub mod message;
pub mod search_result;

pub use answer::{
    AnswerChunk, AnswerKind, AnswerRequest, AnswerResponse, EvidenceItem, EvidenceSource,
    ResultAnswerReport, SynthesizedAnswer,
};
pub use knowledge::{Action, ConcreteEntity, Facet, Knowledge, KnowledgeResponse, SemanticRef};
pub use message::Message;
pub use search_result::{
    ConversationSearchResult, KnowledgeMatches, LanguageSearchFilter, LanguageSearchOptions,
    LanguageSearchOutcome, MessageMatches, RagOptions, ScopePass, ScoredKnowledge,
    ScoredMessageOrdinal, SearchOptions, SelectResult,
};
