//! Trait definitions for scan consumers

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::types::ScanEvent;

/// Receiver of everything a scan produces
///
/// The engine makes no assumption about rendering cadence: mirror trades
/// are handed over as soon as they are found, progress and metrics are
/// sent as each phase advances.
#[async_trait]
pub trait ScanSink: Send {
    /// Handle a single scan event
    async fn handle_event(&mut self, event: ScanEvent);
}

/// Collects events in memory
#[async_trait]
impl ScanSink for Vec<ScanEvent> {
    async fn handle_event(&mut self, event: ScanEvent) {
        self.push(event);
    }
}

/// Buffer size for [`event_channel`]
pub const EVENT_BUFFER: usize = 1000;

/// Channel whose sender is a [`ScanSink`], for rendering on another task
pub fn event_channel() -> (mpsc::Sender<ScanEvent>, mpsc::Receiver<ScanEvent>) {
    mpsc::channel(EVENT_BUFFER)
}

/// Forwards events over a channel; a dropped receiver is not an error
#[async_trait]
impl ScanSink for mpsc::Sender<ScanEvent> {
    async fn handle_event(&mut self, event: ScanEvent) {
        if self.send(event).await.is_err() {
            debug!("Scan event receiver dropped");
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl ScanSink for NullSink {
    async fn handle_event(&mut self, _event: ScanEvent) {}
}
