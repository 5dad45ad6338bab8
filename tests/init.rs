use std::sync::Arc;

use json_error_sink::init::init_tracing;
use json_error_sink::memory::MemoryTracker;
use json_error_sink::InitError;

// Installs the process-wide subscriber, so it is the only test in this binary.
#[test]
fn init_tracing_installs_global_writer() {
    let tracker = Arc::new(MemoryTracker::new());
    let writer = init_tracing(tracker.clone()).unwrap();

    tracing::debug!("ignored");
    tracing::error!(error = "connection reset", "upstream failed");

    let events = tracker.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message.as_deref(), Some("upstream failed"));
    assert_eq!(events[0].exception[0].value, "connection reset");

    let again = init_tracing(Arc::new(MemoryTracker::new()));
    assert!(matches!(again, Err(InitError::SetGlobalDefault(_))));

    writer.close().unwrap();
    assert_eq!(tracker.flushes().len(), 1);
}
