//! Shared test utilities for worker and domain tests
//!
//! In-memory doubles for exercising workers without a broker:
//! - `MemoryDelivery`: a delivery that records how it was resolved
//! - `ResolutionLog`: the shared record those deliveries write to
//! - `MemoryRecorder`: counts outcomes and keeps durations
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true }
//! ```

use amqp_worker::{AmqpError, Delivery, MetricsRecorder, Outcome, Resolution};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Shared record of every resolution made, in call order.
#[derive(Debug, Clone, Default)]
pub struct ResolutionLog {
    entries: Arc<Mutex<Vec<(u64, Resolution)>>>,
}

impl ResolutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Resolution)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, tag: u64, resolution: Resolution) {
        self.lock().push((tag, resolution));
    }

    /// Snapshot of `(delivery_tag, resolution)` pairs.
    pub fn entries(&self) -> Vec<(u64, Resolution)> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn count(&self, resolution: Resolution) -> usize {
        self.lock().iter().filter(|(_, r)| *r == resolution).count()
    }

    /// Resolutions recorded for one delivery tag.
    pub fn for_tag(&self, tag: u64) -> Vec<Resolution> {
        self.lock()
            .iter()
            .filter(|(t, _)| *t == tag)
            .map(|(_, r)| *r)
            .collect()
    }
}

/// A delivery that records its resolution into a [`ResolutionLog`].
#[derive(Debug)]
pub struct MemoryDelivery {
    tag: u64,
    payload: Vec<u8>,
    redelivered: bool,
    fail_resolution: bool,
    log: ResolutionLog,
}

impl MemoryDelivery {
    pub fn new(tag: u64, payload: impl Into<Vec<u8>>, log: &ResolutionLog) -> Self {
        Self {
            tag,
            payload: payload.into(),
            redelivered: false,
            fail_resolution: false,
            log: log.clone(),
        }
    }

    pub fn mark_redelivered(mut self) -> Self {
        self.redelivered = true;
        self
    }

    /// Resolution is still recorded, but the call reports an error.
    pub fn failing_resolution(mut self) -> Self {
        self.fail_resolution = true;
        self
    }

    fn resolve(self, resolution: Resolution) -> Result<(), AmqpError> {
        self.log.record(self.tag, resolution);
        if self.fail_resolution {
            let action = match resolution {
                Resolution::Ack => "ack",
                Resolution::Nack { .. } => "nack",
            };
            return Err(AmqpError::resolve(action, self.tag, "channel closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl Delivery for MemoryDelivery {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn delivery_tag(&self) -> u64 {
        self.tag
    }

    fn redelivered(&self) -> bool {
        self.redelivered
    }

    async fn ack(self) -> Result<(), AmqpError> {
        self.resolve(Resolution::Ack)
    }

    async fn nack(self, requeue: bool) -> Result<(), AmqpError> {
        self.resolve(Resolution::Nack { requeue })
    }
}

/// Counts outcomes and keeps every recorded duration.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    success: AtomicU64,
    error: AtomicU64,
    durations: Mutex<Vec<Duration>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> u64 {
        self.success.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> u64 {
        self.error.load(Ordering::SeqCst)
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.durations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl MetricsRecorder for MemoryRecorder {
    fn record_outcome(&self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.success.fetch_add(1, Ordering::SeqCst),
            Outcome::Error => self.error.fetch_add(1, Ordering::SeqCst),
        };
    }

    fn record_duration(&self, duration: Duration) {
        self.durations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(duration);
    }
}
