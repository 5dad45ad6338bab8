use std::time::Duration;

use crate::env::{env_or, ERROR_SINK_FLUSH_TIMEOUT_MS_ENV, ERROR_SINK_REPORT_LEVELS_ENV};
use crate::error::ConfigError;
use crate::level::ReportPolicy;
use crate::stacktrace::INTERNAL_MODULE;

/// Configuration of an [`ErrorWriter`](crate::writer::ErrorWriter).
///
/// **Fields**
/// - `flush_timeout`: maximum time `close` blocks while the tracker drains.
/// - `report_policy`: severities that are turned into events.
/// - `internal_module`: module path whose frames are trimmed from the end
///   of captured stack traces. Only this one module is trimmed: behind
///   [`json_layer`](crate::init::json_layer) the trace still ends in
///   `std::io::Write::write_all` and the `tracing_subscriber::fmt` /
///   `tracing_core` frames that dispatched the event.
/// - `enable_stdout`: if `true`, [`init_tracing_with_config`] also installs
///   a plain `fmt` layer printing to the console.
///
/// [`init_tracing_with_config`]: crate::init::init_tracing_with_config
#[derive(Clone, Debug)]
pub struct WriterConfig {
    pub flush_timeout: Duration,
    pub report_policy: ReportPolicy,
    pub internal_module: String,
    pub enable_stdout: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            flush_timeout: Duration::from_secs(2),
            report_policy: ReportPolicy::default(),
            internal_module: INTERNAL_MODULE.to_string(),
            enable_stdout: false,
        }
    }
}

impl WriterConfig {
    /// Defaults overridden by `ERROR_SINK_FLUSH_TIMEOUT_MS` and
    /// `ERROR_SINK_REPORT_LEVELS` when they are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout = env_or(ERROR_SINK_FLUSH_TIMEOUT_MS_ENV, "");
        let flush_timeout = if timeout.is_empty() {
            defaults.flush_timeout
        } else {
            parse_millis(&timeout)?
        };

        let levels = env_or(ERROR_SINK_REPORT_LEVELS_ENV, "");
        let report_policy = if levels.is_empty() {
            defaults.report_policy
        } else {
            levels.parse()?
        };

        Ok(Self {
            flush_timeout,
            report_policy,
            ..defaults
        })
    }
}

fn parse_millis(text: &str) -> Result<Duration, ConfigError> {
    text.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidTimeout(text.to_owned()))
}
