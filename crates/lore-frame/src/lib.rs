//! # lore-frame
//!
//! Tabular side-stores ("data frames") whose rows point back at conversation
//! text, queried with the same term-group language as the semantic index.
//!
//! ```text
//! SearchTermGroup ──compile_predicate──▶ CompiledPredicate { sql, params }
//!                                              │
//! FrameStore (writer + read pool) ◀────────────┘
//! └── DataFrameTable ── add_rows / get_row / find_rows / find_sources / rows()
//!     └── GeoTable (latitude, longitude)
//! DataFrameCollection ── scope_for_group ──▶ text ranges for the executor
//! ```

pub mod collection;
pub mod cursor;
pub mod geo;
pub mod pool;
pub mod predicate;
pub mod schema;
pub mod store;
pub mod table;
pub mod value;

pub use collection::{DataFrameCollection, FrameScope};
pub use cursor::RowCursor;
pub use geo::GeoTable;
pub use predicate::{compile_predicate, CompiledPredicate};
pub use schema::{ColumnType, DataFrameColumnDef, DataFrameSchema};
pub use store::FrameStore;
pub use table::DataFrameTable;
pub use value::{coerce_value, DataFrameRow, DataFrameSourceRef, DataFrameValue};

use lore_core::errors::{FrameError, LoreError};

/// Convert a backing-store failure into a lore error.
pub(crate) fn to_storage_err(message: String) -> LoreError {
    LoreError::Frame(FrameError::Storage { message })
}
