//! The term/filter model shared by index-backed search and the relational
//! predicate translator.
//!
//! ```text
//! SearchQuery (translator output)
//! └── SearchExpr*            rewritten query text
//!     └── SearchFilter*      term group + knowledge type + scope hint
//!
//! SearchQueryExpr (compiled)
//! └── SelectExpr*            term group + WhenFilter
//! ```

pub mod group;
pub mod language;
pub mod property_names;
pub mod select;
pub mod term;
pub mod when;

pub use group::{BooleanOp, SearchTermGroup, Term};
pub use language::{ScopeHint, SearchExpr, SearchFilter, SearchQuery};
pub use select::{SearchQueryExpr, SelectExpr};
pub use term::{ComparisonOp, PropertySearchTerm, SearchTerm};
pub use when::{DateRange, KnowledgeType, TextLocation, TextRange, WhenFilter};
