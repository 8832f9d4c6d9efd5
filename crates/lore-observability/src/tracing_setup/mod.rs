//! Tracing setup: structured logging with span definitions.
//!
//! Installation happens at most once per process; later calls are no-ops,
//! so libraries and tests can call these freely.

pub mod spans;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use lore_core::config::defaults::DEFAULT_LOG_FILTER;
use lore_core::config::ObservabilityConfig;

/// Environment variable holding the `EnvFilter` directive.
pub const LOG_ENV: &str = "LORE_LOG";

static INIT: Once = Once::new();

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Human-readable output, filtered by `LORE_LOG` (default `lore=info`).
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter(DEFAULT_LOG_FILTER))
            .with_target(true)
            .try_init();
    });
}

/// JSON lines, filtered by `LORE_LOG` (default `lore=info`).
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter(DEFAULT_LOG_FILTER))
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init();
    });
}

/// Initialize tracing with a custom filter string (for testing or embedding).
/// `LORE_LOG` is ignored.
pub fn init_tracing_with_filter(filter: &str) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

/// Initialize from config: `log_filter` is the fallback when `LORE_LOG`
/// is unset.
pub fn init_from_config(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = env_filter(&config.log_filter);
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
        let _ = if config.json_logs {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
    });
}
