//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use std::sync::Once;

use health_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before the configured level.
pub const LOG_ENV_VAR: &str = "HEALTH_LOG";

static INIT: Once = Once::new();

/// Initialize the global subscriber from configuration.
///
/// `HEALTH_LOG` wins over `config.log_level` when set. Idempotent: only the
/// first call installs a subscriber.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        // try_init so an embedding host that installed its own subscriber wins.
        let _ = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
    });
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    init_tracing(&ObservabilityConfig {
        log_level: filter.to_string(),
        json: false,
    });
}
