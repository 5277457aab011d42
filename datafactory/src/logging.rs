//! Tracing setup for hosts embedding the provider

use tracing_subscriber::EnvFilter;

/// Variable read for the log filter, e.g. `TF_LOG=datafactory=debug`
pub const LOG_ENV: &str = "TF_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a stderr subscriber filtered by `TF_LOG`. Returns false when a
/// global subscriber was already set.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
