//! Environment variable names used by this crate for convenient
//! configuration of the writer from microservices.
//!
//! These are purely helpers; [`WriterConfig`](crate::config::WriterConfig)
//! itself stays decoupled from environment access unless
//! [`WriterConfig::from_env`](crate::config::WriterConfig::from_env) is used.

/// Maximum time `close` blocks while draining the tracker, in milliseconds.
pub const ERROR_SINK_FLUSH_TIMEOUT_MS_ENV: &str = "ERROR_SINK_FLUSH_TIMEOUT_MS";

/// Comma separated level names to report, e.g. `ERROR,WARN`.
pub const ERROR_SINK_REPORT_LEVELS_ENV: &str = "ERROR_SINK_REPORT_LEVELS";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
