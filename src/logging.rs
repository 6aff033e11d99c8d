use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the log filter, e.g. `TAG_SYNC_LOG=debug`
const LOG_ENV: &str = "TAG_SYNC_LOG";

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}
