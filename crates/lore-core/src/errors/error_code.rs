//! LoreErrorCode trait for the presentation boundary.

/// Trait for mapping lore errors to stable error code strings.
/// Every error enum implements this so a shell or binding layer can
/// report failures without matching on variants.
pub trait LoreErrorCode {
    /// Returns the error code string (e.g., "UNKNOWN_COLUMN").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const TRANSLATION_FAILURE: &str = "TRANSLATION_FAILURE";
pub const NO_CONVERSATION_LOADED: &str = "NO_CONVERSATION_LOADED";
pub const UNKNOWN_COLUMN: &str = "UNKNOWN_COLUMN";
pub const TYPE_MISMATCH: &str = "TYPE_MISMATCH";
pub const UNSUPPORTED_TERM: &str = "UNSUPPORTED_TERM";
pub const INVALID_IDENTIFIER: &str = "INVALID_IDENTIFIER";
pub const FRAME_STORAGE_ERROR: &str = "FRAME_STORAGE_ERROR";
pub const EXECUTION_ERROR: &str = "EXECUTION_ERROR";
pub const GENERATION_FAILURE: &str = "GENERATION_FAILURE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
pub const CANCELLED: &str = "CANCELLED";
pub const TIMEOUT: &str = "TIMEOUT";
