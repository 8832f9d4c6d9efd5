//! Configuration loading and validation.

use std::io::Write;

use lore_core::config::defaults;
use lore_core::errors::ConfigError;
use lore_core::LoreConfig;

#[test]
fn defaults_are_valid() {
    let config = LoreConfig::default();
    assert!(config.validate().is_ok());
    assert!(config.search.exact_scope);
    assert_eq!(config.answer.max_chars_in_budget, defaults::DEFAULT_MAX_CHARS_IN_BUDGET);
    assert_eq!(config.ingest.concurrency, defaults::DEFAULT_INGEST_CONCURRENCY);
}

#[test]
fn partial_toml_fills_defaults() {
    let config = LoreConfig::from_toml(
        r#"
        [search]
        exact_scope = false

        [answer]
        max_chars_in_budget = 2000
        "#,
    )
    .unwrap();
    assert!(!config.search.exact_scope);
    assert!(config.search.apply_scope);
    assert_eq!(config.answer.max_chars_in_budget, 2000);
    assert_eq!(config.frame.cursor_page_size, defaults::DEFAULT_CURSOR_PAGE_SIZE);
}

#[test]
fn invalid_toml_is_parse_error() {
    let err = LoreConfig::from_toml("[search\nexact_scope = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn out_of_range_threshold_rejected() {
    let err = LoreConfig::from_toml("[answer]\nrag_threshold = 1.5").unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => assert_eq!(field, "answer.rag_threshold"),
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

#[test]
fn zero_concurrency_rejected() {
    let err = LoreConfig::from_toml("[ingest]\nconcurrency = 0").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[frame]\ncursor_page_size = 3").unwrap();
    let config = LoreConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.frame.cursor_page_size, 3);
}

#[test]
fn load_missing_file_is_not_found() {
    let err = LoreConfig::load(Some(std::path::Path::new("/nonexistent/lore.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}
