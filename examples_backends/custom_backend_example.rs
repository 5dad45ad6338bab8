use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use json_error_sink::{
    channel::ChannelTracker,
    event::ErrorEvent,
    init::init_tracing,
    sink::EventSink,
};

/// Example of integrating a completely custom backend by implementing
/// the `EventSink` trait directly. Imagine this talks to some
/// proprietary error tracker for which this crate does not provide a
/// built-in sink.
struct MyTrackerSink;

#[async_trait]
impl EventSink for MyTrackerSink {
    async fn send(
        &self,
        event: &ErrorEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Here you would call your own client library for the tracker.
        // For the sake of example we just print the event.
        let frames = event.exception.first().map(|e| e.stacktrace.frames.len()).unwrap_or(0);
        println!("[my-tracker] {:?} {:?} ({} frames)", event.level, event.message, frames);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let (tracker, _handle) = ChannelTracker::new(Arc::new(MyTrackerSink), 1024);
    let writer = init_tracing(Arc::new(tracker)).expect("install subscriber");

    info!("custom backend example started");
    error!(error = "connection refused", db = "orders", "simulated error sent via custom backend");

    // Flushing blocks, keep it off the async workers.
    tokio::task::spawn_blocking(move || writer.close())
        .await
        .expect("join flush")
        .expect("close writer");
}
