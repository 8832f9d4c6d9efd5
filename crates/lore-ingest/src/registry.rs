//! Named extractor variants, owned by the caller's session.

use std::collections::BTreeMap;
use std::sync::Arc;

use lore_core::config::IngestConfig;
use lore_core::errors::ConfigError;
use lore_core::traits::IKnowledgeExtractor;
use lore_core::LoreResult;

/// Extractors keyed by name, with one designated default. Built once per
/// session and passed by reference.
pub struct ExtractorRegistry<E> {
    extractors: BTreeMap<String, Arc<E>>,
    default_name: String,
}

impl<E: IKnowledgeExtractor> ExtractorRegistry<E> {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            extractors: BTreeMap::new(),
            default_name: default_name.into(),
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.default_extractor.clone())
    }

    /// Register (or replace) a variant. Returns the replaced one.
    pub fn register(&mut self, name: impl Into<String>, extractor: E) -> Option<Arc<E>> {
        self.extractors.insert(name.into(), Arc::new(extractor))
    }

    pub fn with(mut self, name: impl Into<String>, extractor: E) -> Self {
        self.register(name, extractor);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<E>> {
        self.extractors.get(name).cloned()
    }

    /// The named variant, or the default when `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> LoreResult<Arc<E>> {
        let name = name.unwrap_or(self.default_name.as_str());
        self.get(name).ok_or_else(|| {
            ConfigError::ValidationFailed {
                field: "ingest.default_extractor".to_string(),
                message: format!("no extractor registered as '{name}'"),
            }
            .into()
        })
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.extractors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}
