//! Collaborator and capability traits.
//!
//! Async methods are declared with `async fn` in traits; implementations
//! are consumed generically, not as trait objects.

pub mod cancellation;
pub mod consent;
pub mod extractor;
pub mod generator;
pub mod index;
pub mod searchable_memory;
pub mod translator;

pub use cancellation::{Cancellable, CancellationToken};
pub use consent::{AutoConsent, DeclineRelaxation, IRelaxationConsent};
pub use extractor::IKnowledgeExtractor;
pub use generator::IAnswerGenerator;
pub use index::IConversationIndex;
pub use searchable_memory::ISearchableMemory;
pub use translator::{IQueryTranslator, TranslationHints};
