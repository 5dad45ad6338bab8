use crate::event::ErrorEvent;
use crate::sink::EventSink;
use crate::tracker::ErrorTracker;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// [`ErrorTracker`] that forwards events to an asynchronous [`EventSink`]
/// via a bounded channel and background task.
///
/// `submit` never blocks: when the channel is full the event is dropped
/// and counted. Sink failures drop the event as well, there is no retry.
pub struct ChannelTracker {
    sender: mpsc::Sender<ErrorEvent>,
    pending: Arc<Pending>,
    /// Total events submitted to the tracker.
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full.
    pub dropped_events: Arc<AtomicU64>,
    /// Dropped because the background task is no longer running.
    pub closed_events: Arc<AtomicU64>,
}

impl ChannelTracker {
    /// Create a new tracker and spawn a background task that pulls
    /// [`ErrorEvent`]s from a bounded channel and sends them to the
    /// provided [`EventSink`].
    ///
    /// Must be called from within a Tokio runtime. `buffer` is raised to a
    /// minimum of 16.
    pub fn new(sink: Arc<dyn EventSink>, buffer: usize) -> (Self, JoinHandle<()>) {
        let buffer = buffer.max(16);
        let (tx, mut rx) = mpsc::channel::<ErrorEvent>(buffer);
        let pending = Arc::new(Pending::default());
        let pending_bg = Arc::clone(&pending);

        // Diagnostics below stay under ERROR: when the writer is installed as
        // the global subscriber output they are fed back into it.
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = sink.send(&event).await {
                    warn!(reason = %e, "error event sink failed, dropping event");
                }
                if pending_bg.is_last() {
                    if let Err(e) = sink.flush().await {
                        warn!(reason = %e, "error event sink flush failed");
                    }
                }
                pending_bg.done();
            }
            debug!("error event channel closed");
        });

        (
            Self {
                sender: tx,
                pending,
                total_events: Arc::new(AtomicU64::new(0)),
                enqueued_events: Arc::new(AtomicU64::new(0)),
                dropped_events: Arc::new(AtomicU64::new(0)),
                closed_events: Arc::new(AtomicU64::new(0)),
            },
            handle,
        )
    }
}

impl ErrorTracker for ChannelTracker {
    fn submit(&self, event: ErrorEvent) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        self.pending.add();

        match self.sender.try_send(event) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_)) => {
                self.pending.done();
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Closed(_)) => {
                self.pending.done();
                self.closed_events.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Blocks the calling thread; do not call from a current-thread runtime
    /// that also drives the background task.
    fn flush(&self, timeout: Duration) -> bool {
        self.pending.wait(timeout)
    }
}

/// Number of events enqueued but not yet handed to the sink.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    drained: Condvar,
}

impl Pending {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self) {
        *self.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn is_last(&self) -> bool {
        *self.lock() <= 1
    }

    fn wait(&self, timeout: Duration) -> bool {
        let (count, _) = self
            .drained
            .wait_timeout_while(self.lock(), timeout, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;
    use async_trait::async_trait;
    use std::error::Error;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<Option<String>>>,
        flushes: AtomicU64,
        fail: bool,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn send(&self, event: &ErrorEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
            if self.fail {
                return Err("backend unavailable".into());
            }
            self.sent.lock().unwrap().push(event.message.clone());
            Ok(())
        }

        async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.flushes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn event(message: &str) -> ErrorEvent {
        let mut event = ErrorEvent::new(Severity::Error);
        event.message = Some(message.to_owned());
        event
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn forwards_in_order_and_drains_on_flush() {
        let sink = Arc::new(RecordingSink::default());
        let (tracker, _handle) = ChannelTracker::new(sink.clone(), 64);
        let tracker = Arc::new(tracker);

        for message in ["a", "b", "c"] {
            tracker.submit(event(message));
        }

        let flusher = Arc::clone(&tracker);
        let drained = tokio::task::spawn_blocking(move || flusher.flush(Duration::from_secs(5)))
            .await
            .unwrap();

        assert!(drained);
        let sent = sink.sent.lock().unwrap().clone();
        assert_eq!(sent, [Some("a".to_owned()), Some("b".to_owned()), Some("c".to_owned())]);
        assert!(sink.flushes.load(Ordering::Relaxed) >= 1);
        assert_eq!(tracker.total_events.load(Ordering::Relaxed), 3);
        assert_eq!(tracker.enqueued_events.load(Ordering::Relaxed), 3);
        assert_eq!(tracker.dropped_events.load(Ordering::Relaxed), 0);
        assert_eq!(tracker.closed_events.load(Ordering::Relaxed), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failing_sink_drops_without_blocking_flush() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let (tracker, _handle) = ChannelTracker::new(sink.clone(), 16);
        let tracker = Arc::new(tracker);
        tracker.submit(event("lost"));

        let flusher = Arc::clone(&tracker);
        let drained = tokio::task::spawn_blocking(move || flusher.flush(Duration::from_secs(5)))
            .await
            .unwrap();

        assert!(drained);
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    // The current-thread runtime does not poll the forwarder until the test
    // yields, so the channel fills up.
    #[tokio::test]
    async fn full_channel_drops_and_counts() {
        let sink = Arc::new(RecordingSink::default());
        let (tracker, _handle) = ChannelTracker::new(sink, 16);

        for i in 0..17 {
            tracker.submit(event(&i.to_string()));
        }

        assert_eq!(tracker.enqueued_events.load(Ordering::Relaxed), 16);
        assert_eq!(tracker.dropped_events.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.closed_events.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn stopped_forwarder_counts_closed() {
        let sink = Arc::new(RecordingSink::default());
        let (tracker, handle) = ChannelTracker::new(sink, 16);
        handle.abort();
        let _ = handle.await;

        tracker.submit(event("late"));

        assert_eq!(tracker.closed_events.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.dropped_events.load(Ordering::Relaxed), 0);
        assert!(tracker.flush(Duration::from_millis(10)));
    }

    #[test]
    fn flush_times_out_when_nothing_drains() {
        let pending = Pending::default();
        pending.add();
        assert!(!pending.wait(Duration::from_millis(20)));
        pending.done();
        assert!(pending.wait(Duration::from_millis(20)));
    }
}
