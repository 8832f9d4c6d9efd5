//! Error handling for lore.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod frame_error;
pub mod lore_error;

pub use config_error::ConfigError;
pub use error_code::LoreErrorCode;
pub use frame_error::FrameError;
pub use lore_error::LoreError;

/// Convenience alias used across the workspace.
pub type LoreResult<T> = Result<T, LoreError>;
