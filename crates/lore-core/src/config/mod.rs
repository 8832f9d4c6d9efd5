//! Configuration for lore.
//! TOML-based, resolved as: env overrides > config file > compiled defaults.

pub mod answer_config;
pub mod defaults;
pub mod frame_config;
pub mod ingest_config;
pub mod lore_config;
pub mod observability_config;
pub mod search_config;

pub use answer_config::AnswerConfig;
pub use frame_config::FrameConfig;
pub use ingest_config::IngestConfig;
pub use lore_config::LoreConfig;
pub use observability_config::ObservabilityConfig;
pub use search_config::SearchConfig;
