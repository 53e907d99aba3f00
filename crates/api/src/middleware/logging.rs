//! Logging initialization and configuration.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Initializes the logging subsystem based on configuration.
///
/// `RUST_LOG` wins over the configured level. sqlx statement logging is
/// noisy at the default level and carries bound parameters, so it is
/// capped at warn unless explicitly re-enabled.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx::query=warn", config.level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.format == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true),
            )
            .init();
    }
}
