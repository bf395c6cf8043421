//! Shared admission gate for outbound requests

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default number of requests allowed in flight at once
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// Bounded concurrency gate
///
/// One gate is shared by every fetch of a scanner so the bound holds across
/// phases, not per batch. The in-flight and peak gauges exist so callers can
/// observe the bound.
#[derive(Debug)]
pub struct FetchGate {
    semaphore: Semaphore,
    capacity: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FetchGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(capacity))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous holders seen so far
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Run `fut` while holding one slot; the slot is released however `fut` ends
    pub async fn run<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquire cannot fail.
        let _permit = self.semaphore.acquire().await.ok();
        let _slot = SlotGuard::enter(self);
        fut.await
    }
}

impl Default for FetchGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

struct SlotGuard<'a> {
    gate: &'a FetchGate,
}

impl<'a> SlotGuard<'a> {
    fn enter(gate: &'a FetchGate) -> Self {
        let now = gate.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        gate.peak.fetch_max(now, Ordering::SeqCst);
        Self { gate }
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
