use std::borrow::Cow;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::fmt::MakeWriter;

use crate::config::WriterConfig;
use crate::error::ParseError;
use crate::event::{build_event, ErrorEvent, LEVEL_KEY};
use crate::level::{ReportPolicy, Severity};
use crate::record;
use crate::stacktrace::INTERNAL_MODULE;
use crate::tracker::ErrorTracker;

/// Sink for serialized JSON log records that reports the severe ones to an
/// [`ErrorTracker`].
///
/// Each write must carry exactly one record. Records whose level is in the
/// [`ReportPolicy`] become an [`ErrorEvent`]; all others are accepted and
/// dropped. Cloning is cheap and clones share the tracker.
#[derive(Clone)]
pub struct ErrorWriter {
    tracker: Arc<dyn ErrorTracker>,
    flush_timeout: Duration,
    policy: ReportPolicy,
    internal_module: Cow<'static, str>,
}

impl ErrorWriter {
    /// Writer with the default policy and trimming module.
    pub fn new(tracker: Arc<dyn ErrorTracker>, flush_timeout: Duration) -> Self {
        Self {
            tracker,
            flush_timeout,
            policy: ReportPolicy::default(),
            internal_module: Cow::Borrowed(INTERNAL_MODULE),
        }
    }

    pub fn with_config(tracker: Arc<dyn ErrorTracker>, config: &WriterConfig) -> Self {
        Self {
            tracker,
            flush_timeout: config.flush_timeout,
            policy: config.report_policy,
            internal_module: Cow::Owned(config.internal_module.clone()),
        }
    }

    /// Process one record and submit its event, if any.
    ///
    /// **Returns**
    /// - `Ok(data.len())` whether the record was reported or skipped.
    /// - `Err(..)` if the record is malformed or has no `level`; nothing is
    ///   submitted.
    pub fn write_record(&self, data: &[u8]) -> Result<usize, ParseError> {
        if let Some(event) = self.parse_event(data)? {
            self.tracker.submit(event);
        }
        Ok(data.len())
    }

    /// Build the event for `data`, or `None` if its level is not reported.
    pub fn parse_event(&self, data: &[u8]) -> Result<Option<ErrorEvent>, ParseError> {
        let level = Severity::classify(&record::field(data, LEVEL_KEY)?);
        if !self.policy.contains(level) {
            return Ok(None);
        }

        build_event(data, level, &self.internal_module).map(Some)
    }

    /// Drain the tracker for up to the configured flush timeout.
    ///
    /// Undelivered events are lost on timeout; that is not reported.
    pub fn close(&self) -> io::Result<()> {
        let _drained = self.tracker.flush(self.flush_timeout);
        Ok(())
    }
}

impl io::Write for &ErrorWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_record(buf)?)
    }

    /// Delivery is flushed by [`ErrorWriter::close`], not per write.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for ErrorWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl<'a> MakeWriter<'a> for ErrorWriter {
    type Writer = &'a ErrorWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}
