//! Tracing subscriber setup
//!
//! Filter precedence: `FLOWSHARE_LOG`, then `--verbose`, then the configured level.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "FLOWSHARE_LOG";

/// Pick the filter directive to use
pub fn resolve_filter(env_value: Option<&str>, verbose: bool, config_level: &str) -> String {
    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        return value.to_string();
    }
    if verbose {
        return "debug".to_string();
    }
    let level = config_level.trim();
    if level.is_empty() {
        "warn".to_string()
    } else {
        level.to_string()
    }
}

/// Install the global stderr subscriber. A second call is a no-op.
pub fn init_logging(verbose: bool, config_level: &str) {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = resolve_filter(env_value.as_deref(), verbose, config_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
