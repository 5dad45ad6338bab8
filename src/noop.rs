use crate::event::ErrorEvent;
use crate::tracker::ErrorTracker;
use std::time::Duration;

/// A tracker that simply drops all events.
///
/// Useful for measuring the overhead of the writer itself without any
/// external I/O.
#[derive(Clone, Debug, Default)]
pub struct NoopTracker;

impl ErrorTracker for NoopTracker {
    fn submit(&self, _event: ErrorEvent) {}

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}
