use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::event::ErrorEvent;
use crate::tracker::ErrorTracker;

/// Tracker that keeps every submitted event in memory.
///
/// Meant for tests and for embedding applications that inspect reported
/// errors themselves.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    events: Mutex<Vec<ErrorEvent>>,
    flushes: Mutex<Vec<Duration>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the submitted events, oldest first.
    pub fn events(&self) -> Vec<ErrorEvent> {
        lock(&self.events).clone()
    }

    /// Remove and return the submitted events.
    pub fn take(&self) -> Vec<ErrorEvent> {
        std::mem::take(&mut *lock(&self.events))
    }

    /// Timeouts passed to every `flush` call so far.
    pub fn flushes(&self) -> Vec<Duration> {
        lock(&self.flushes).clone()
    }
}

impl ErrorTracker for MemoryTracker {
    fn submit(&self, event: ErrorEvent) {
        lock(&self.events).push(event);
    }

    fn flush(&self, timeout: Duration) -> bool {
        lock(&self.flushes).push(timeout);
        true
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
