// Logging/tracing setup

use dimdate_config::{LogFormat, LoggingConfig};

/// Initialize tracing/logging from the logging config
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Parse log level from config
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Try to set the global subscriber; ignore error if already set (idempotent)
    let _ = match config.format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))
        }
        LogFormat::Text => tracing::subscriber::set_global_default(registry.with(fmt::layer())),
    };
}
