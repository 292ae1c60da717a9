use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BUNDLEFS_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// `BUNDLEFS_LOG` when it parses as a filter directive, otherwise `warn`.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable. A second call is a no-op.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
