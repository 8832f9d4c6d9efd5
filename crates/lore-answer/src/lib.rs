//! # lore-answer
//!
//! Streams the evidence behind search results to an answer generator in
//! character-bounded chunks and merges what comes back.
//!
//! ```text
//! ConversationSearchResult ──(no match? RAG fallback)──▶ evidence
//!   └── rank ──▶ pack_evidence(budget) ──▶ chunk* ──▶ IAnswerGenerator ──▶ merge
//! ```

pub mod evidence;
pub mod options;
pub mod packing;
pub mod synthesizer;

pub use options::AnswerOptions;
pub use packing::{pack_evidence, PackedEvidence};
pub use synthesizer::AnswerSynthesizer;
