//! Test support for lore: an in-memory conversation index with real
//! boolean term-group semantics, scripted translator/generator/extractor
//! collaborators, and loaders for JSON conversation fixtures.

pub mod builders;
pub mod collaborators;
pub mod index;

use std::path::PathBuf;

use serde::de::DeserializeOwned;

pub use builders::ConversationFixture;
pub use collaborators::{CountingConsent, ScriptedExtractor, ScriptedGenerator, ScriptedTranslator};
pub use index::FixtureIndex;

/// Root directory of the bundled JSON fixtures.
pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}
