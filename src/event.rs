use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ParseError;
use crate::level::Severity;
use crate::record;
use crate::stacktrace::StackTrace;

/// Record key holding the human readable message.
pub const MESSAGE_KEY: &str = "message";

/// Record key holding an error value. Every occurrence yields one
/// [`ErrorDescriptor`].
pub const ERROR_KEY: &str = "error";

/// Record key holding the level name.
pub const LEVEL_KEY: &str = "level";

/// Logger tag attached to every event built by this crate.
pub const LOGGER: &str = env!("CARGO_PKG_NAME");

/// Normalized error event handed to an [`ErrorTracker`](crate::tracker::ErrorTracker).
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    /// Time the event was built, not the record's own timestamp.
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub logger: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub exception: Vec<ErrorDescriptor>,
}

impl ErrorEvent {
    pub fn new(level: Severity) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger: LOGGER,
            message: None,
            exception: Vec::new(),
        }
    }
}

/// One reported error value and the call stack that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDescriptor {
    pub value: String,
    pub stacktrace: StackTrace,
}

/// Build an event from a record already classified as `level`.
///
/// Every `error` field captures its own trace, trimmed of
/// `internal_module` frames. A structural error anywhere in the record
/// fails the whole build.
pub fn build_event(
    data: &[u8],
    level: Severity,
    internal_module: &str,
) -> Result<ErrorEvent, ParseError> {
    let mut event = ErrorEvent::new(level);

    record::each_field(data, |field| {
        match field.key() {
            MESSAGE_KEY => event.message = Some(field.text().to_owned()),
            ERROR_KEY => event.exception.push(ErrorDescriptor {
                value: field.text().to_owned(),
                stacktrace: StackTrace::capture(internal_module),
            }),
            _ => {}
        }
        Ok::<_, ParseError>(())
    })?;

    Ok(event)
}
