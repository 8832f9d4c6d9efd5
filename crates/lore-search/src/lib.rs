//! # lore-search
//!
//! Turns a translated [`SearchQuery`](lore_core::query::SearchQuery) into
//! compiled select expressions and runs them with one optional scope
//! relaxation.
//!
//! ```text
//! text ──translator──▶ SearchQuery ──compile(exact)──▶ [SearchQueryExpr]
//!                                                         │
//!                      AdaptiveExecutor: Strict ──▶ Executed ──(0 matches, consent)──▶ Relaxed ──▶ Executed ──▶ Done
//! ```

pub mod compiler;
pub mod executor;
pub mod memory;

pub use compiler::{compile, CompileOptions, ConversationScope};
pub use executor::{AdaptiveExecutor, SearchState};
pub use memory::ConversationMemory;
