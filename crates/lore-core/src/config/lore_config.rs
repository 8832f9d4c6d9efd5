//! Top-level lore configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AnswerConfig, FrameConfig, IngestConfig, ObservabilityConfig, SearchConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Owned by the caller's session and passed by reference; there is no
/// process-wide instance.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`LORE_*`)
/// 2. Config file (`lore.toml`)
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoreConfig {
    pub search: SearchConfig,
    pub answer: AnswerConfig,
    pub frame: FrameConfig,
    pub ingest: IngestConfig,
    pub observability: ObservabilityConfig,
}

impl LoreConfig {
    /// Load configuration from an optional file, then apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: LoreConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `LORE_*` environment overrides. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<bool>("LORE_EXACT_SCOPE") {
            self.search.exact_scope = v;
        }
        if let Some(v) = env_parse::<usize>("LORE_MAX_CHARS_IN_BUDGET") {
            self.answer.max_chars_in_budget = v;
        }
        if let Some(v) = env_parse::<usize>("LORE_INGEST_CONCURRENCY") {
            self.ingest.concurrency = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.answer.rag_threshold) {
            return Err(invalid("answer.rag_threshold", "must be between 0.0 and 1.0"));
        }
        if self.answer.max_chars_in_budget == 0 {
            return Err(invalid("answer.max_chars_in_budget", "must be greater than 0"));
        }
        if self.answer.max_chunks == 0 {
            return Err(invalid("answer.max_chunks", "must be greater than 0"));
        }
        if self.ingest.batch_size == 0 {
            return Err(invalid("ingest.batch_size", "must be greater than 0"));
        }
        if self.ingest.concurrency == 0 {
            return Err(invalid("ingest.concurrency", "must be greater than 0"));
        }
        if self.frame.cursor_page_size == 0 {
            return Err(invalid("frame.cursor_page_size", "must be greater than 0"));
        }
        if !(1..=8).contains(&self.frame.read_pool_size) {
            return Err(invalid("frame.read_pool_size", "must be between 1 and 8"));
        }
        if self.search.select_timeout_ms == Some(0) {
            return Err(invalid("search.select_timeout_ms", "must be greater than 0 when set"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
