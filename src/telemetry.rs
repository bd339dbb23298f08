//! Process-wide tracing subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Pick the filter directive: explicit flag, then `RUST_LOG`, then `info`.
pub fn filter_for(log_level: Option<&str>) -> EnvFilter {
    if let Some(level) = log_level.map(str::trim).filter(|l| !l.is_empty()) {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Call once from `main`.
pub fn init(log_level: Option<&str>) -> Result<(), String> {
    tracing_subscriber::registry()
        .with(filter_for(log_level))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| format!("failed to initialise tracing subscriber: {e}"))
}
