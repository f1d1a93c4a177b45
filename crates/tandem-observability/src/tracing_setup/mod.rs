//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use tandem_core::config::ObservabilityConfig;
use tandem_core::{TandemError, TandemResult};
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the log filter.
pub const LOG_ENV_VAR: &str = "TANDEM_LOG";

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects the `TANDEM_LOG` environment variable for filtering.
/// Defaults to `info` level if not set.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .init();
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .init();
}

/// Initialize tracing from configuration.
///
/// `TANDEM_LOG` still wins over `log_level` when set. Unlike the other
/// initializers this does not panic when a global subscriber already exists;
/// it returns a `ConfigError` instead.
pub fn init_from_config(config: &ObservabilityConfig) -> TandemResult<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TandemError::ConfigError(format!("invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| TandemError::ConfigError(format!("tracing already initialized: {e}")))
}
