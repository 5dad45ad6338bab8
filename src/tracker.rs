use std::time::Duration;

use crate::event::ErrorEvent;

/// Destination for [`ErrorEvent`]s built by the writer.
///
/// The writer calls `submit` on whatever thread performed the write, so
/// implementations must accept concurrent submissions. Delivery, batching
/// and retries are entirely up to the implementation.
pub trait ErrorTracker: Send + Sync {
    /// Enqueue an event for delivery. Must not block on I/O.
    fn submit(&self, event: ErrorEvent);

    /// Block until every submitted event is delivered or `timeout` elapses.
    ///
    /// **Returns**
    /// - `true` if the queue drained in time.
    /// - `false` on timeout; undelivered events may be lost.
    fn flush(&self, timeout: Duration) -> bool;
}
