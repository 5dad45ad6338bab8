//! Turns structured JSON log records into error-tracking events.
//!
//! An [`ErrorWriter`] receives one serialized record per write, reports
//! the ones whose level is in its [`ReportPolicy`] and hands the resulting
//! [`ErrorEvent`] to an [`ErrorTracker`]. Every `error` field of a record
//! becomes an [`ErrorDescriptor`] carrying the call stack of the write,
//! with this crate's own frames trimmed off.

pub mod config;
pub mod env;
pub mod error;
pub mod event;
pub mod level;
pub mod record;
pub mod stacktrace;
pub mod writer;

pub mod tracker;
pub mod sink;
pub mod channel;
pub mod memory;
pub mod noop;

#[cfg(feature = "console")]
pub mod console;

pub mod init;

pub use config::WriterConfig;
pub use error::{ConfigError, InitError, ParseError};
pub use event::{ErrorDescriptor, ErrorEvent};
pub use level::{ReportPolicy, Severity};
pub use stacktrace::{Frame, StackTrace};
pub use tracker::ErrorTracker;
pub use writer::ErrorWriter;
