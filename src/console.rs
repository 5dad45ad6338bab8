use crate::event::ErrorEvent;
use crate::sink::EventSink;
use async_trait::async_trait;
use std::error::Error;
use std::io::Write;

/// Writes every event to stdout as a single JSON line.
///
/// Handy during development, before a real error-tracking backend is
/// wired in.
#[derive(Clone, Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl EventSink for ConsoleSink {
    async fn send(&self, event: &ErrorEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let line = serde_json::to_string(event)? + "\n";
        std::io::stdout().lock().write_all(line.as_bytes())?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        std::io::stdout().flush()?;
        Ok(())
    }
}
