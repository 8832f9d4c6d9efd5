//! # lore-core
//!
//! Foundation crate for the lore search pipeline.
//! Defines the term/filter model, collaborator traits, errors, config, and
//! the result models every other crate in the workspace exchanges.

pub mod config;
pub mod errors;
pub mod models;
pub mod query;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::LoreConfig;
pub use errors::{LoreError, LoreResult};
pub use query::{
    BooleanOp, ComparisonOp, DateRange, KnowledgeType, PropertySearchTerm, SearchQueryExpr,
    SearchTerm, SearchTermGroup, SelectExpr, Term, TextLocation, TextRange, WhenFilter,
};
