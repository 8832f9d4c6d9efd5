//! Top-level error aggregating every subsystem.

use super::error_code::{self, LoreErrorCode};
use super::{ConfigError, FrameError};

/// Errors surfaced across the public boundary of every lore crate.
#[derive(Debug, thiserror::Error)]
pub enum LoreError {
    /// The natural-language-to-structured-query step failed.
    /// Reported verbatim and never retried automatically.
    #[error("query translation failed: {reason}")]
    TranslationFailure { reason: String },

    /// Systemic precondition violation: there is nothing to search.
    #[error("no conversation loaded")]
    NoConversationLoaded,

    #[error("data frame error: {0}")]
    Frame(#[from] FrameError),

    /// Failure while executing one select expression. Recovered locally by
    /// the executor.
    #[error("execution failed for '{expression}': {reason}")]
    ExecutionError { expression: String, reason: String },

    #[error("answer generation failed: {reason}")]
    GenerationFailure { reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("{operation} timed out after {millis}ms")]
    Timeout { operation: String, millis: u64 },
}

impl LoreError {
    /// Systemic errors abort a whole pipeline; everything else is recovered
    /// per item.
    pub fn is_systemic(&self) -> bool {
        matches!(self, Self::NoConversationLoaded | Self::Cancelled)
    }

    /// Shorthand for an execution error on a described expression.
    pub fn execution(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExecutionError {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

impl LoreErrorCode for LoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TranslationFailure { .. } => error_code::TRANSLATION_FAILURE,
            Self::NoConversationLoaded => error_code::NO_CONVERSATION_LOADED,
            Self::Frame(e) => e.error_code(),
            Self::ExecutionError { .. } => error_code::EXECUTION_ERROR,
            Self::GenerationFailure { .. } => error_code::GENERATION_FAILURE,
            Self::Config(e) => e.error_code(),
            Self::Serialization(_) => error_code::SERIALIZATION_ERROR,
            Self::Cancelled => error_code::CANCELLED,
            Self::Timeout { .. } => error_code::TIMEOUT,
        }
    }
}
