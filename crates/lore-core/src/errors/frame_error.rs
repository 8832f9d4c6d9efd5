//! Data frame (relational predicate) errors.
//!
//! All of these except `Storage` are raised while compiling or validating,
//! before any SQL reaches the backing store.

use super::error_code::{self, LoreErrorCode};

/// Errors raised by the predicate translator and data frame tables.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("unknown column '{column}' in data frame '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("type mismatch for column '{column}': expected {expected}, got '{value}'")]
    TypeMismatch {
        column: String,
        expected: String,
        value: String,
    },

    #[error("unsupported term in data frame filter: {reason}")]
    UnsupportedTerm { reason: String },

    #[error("invalid identifier: '{name}'")]
    InvalidIdentifier { name: String },

    #[error("data frame storage error: {message}")]
    Storage { message: String },
}

impl LoreErrorCode for FrameError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownColumn { .. } => error_code::UNKNOWN_COLUMN,
            Self::TypeMismatch { .. } => error_code::TYPE_MISMATCH,
            Self::UnsupportedTerm { .. } => error_code::UNSUPPORTED_TERM,
            Self::InvalidIdentifier { .. } => error_code::INVALID_IDENTIFIER,
            Self::Storage { .. } => error_code::FRAME_STORAGE_ERROR,
        }
    }
}
