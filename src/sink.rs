use crate::event::ErrorEvent;
use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for [`ErrorEvent`]s drained by a
/// [`ChannelTracker`](crate::channel::ChannelTracker).
///
/// Implementations are responsible for transporting events to a concrete
/// backend. The tracker calls `send` from a background task and never
/// awaits it on the application thread.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Send a single event to the underlying backend.
    ///
    /// **Parameters**
    /// - `event`: fully-populated [`ErrorEvent`] produced by the writer.
    ///
    /// **Returns**
    /// - `Ok(())` if the event was accepted by the backend.
    /// - `Err(..)` if the backend failed. The tracker drops the event; it
    ///   does not retry.
    async fn send(&self, event: &ErrorEvent) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered events, if the backend implements buffering.
    ///
    /// Called by the tracker whenever its queue runs empty. Default
    /// implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
