//! A single worker: pull one delivery, process it, resolve it, repeat.

use crate::config::RequeuePolicy;
use crate::delivery::{Delivery, Resolution};
use crate::error::ProcessingError;
use crate::handler::MessageHandler;
use crate::intake::Intake;
use crate::metrics::{MetricsRecorder, Outcome};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Cancellation was observed while idle.
    Cancelled,
    /// The shared intake closed.
    IntakeClosed,
}

/// What a worker did during its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub received: u64,
    pub acked: u64,
    pub nacked: u64,
    /// Subset of `nacked` sent back to the queue
    pub requeued: u64,
    /// Ack or nack calls the broker rejected
    pub resolve_failures: u64,
    pub exit: ExitReason,
}

impl WorkerReport {
    fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            received: 0,
            acked: 0,
            nacked: 0,
            requeued: 0,
            resolve_failures: 0,
            exit: ExitReason::Cancelled,
        }
    }
}

/// One member of a [`WorkerPool`](crate::WorkerPool).
///
/// Between deliveries the worker waits on "next delivery or cancellation",
/// whichever comes first. Once a delivery is taken it is processed and
/// resolved before cancellation is looked at again.
pub struct Worker<D, H, M> {
    id: usize,
    intake: Intake<D>,
    shutdown: watch::Receiver<bool>,
    handler: Arc<H>,
    metrics: Arc<M>,
    policy: RequeuePolicy,
}

impl<D, H, M> Worker<D, H, M>
where
    D: Delivery,
    H: MessageHandler,
    M: MetricsRecorder,
{
    pub fn new(
        id: usize,
        intake: Intake<D>,
        shutdown: watch::Receiver<bool>,
        handler: Arc<H>,
        metrics: Arc<M>,
        policy: RequeuePolicy,
    ) -> Self {
        Self {
            id,
            intake,
            shutdown,
            handler,
            metrics,
            policy,
        }
    }

    /// Run until cancelled or the intake closes.
    pub async fn run(mut self) -> WorkerReport {
        let mut report = WorkerReport::new(self.id);
        info!(worker_id = self.id, handler = self.handler.name(), "Worker started");

        loop {
            if *self.shutdown.borrow() {
                report.exit = ExitReason::Cancelled;
                break;
            }

            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    // A dropped sender means nobody can cancel us any more: stop.
                    if changed.is_err() || *self.shutdown.borrow() {
                        report.exit = ExitReason::Cancelled;
                        break;
                    }
                }

                next = self.intake.recv() => match next {
                    Some(delivery) => self.process(delivery, &mut report).await,
                    None => {
                        report.exit = ExitReason::IntakeClosed;
                        break;
                    }
                }
            }
        }

        match report.exit {
            ExitReason::Cancelled => info!(worker_id = self.id, "Worker stopping"),
            ExitReason::IntakeClosed => warn!(worker_id = self.id, "Intake closed, worker exiting"),
        }

        report
    }

    async fn process(&self, delivery: D, report: &mut WorkerReport) {
        let delivery_tag = delivery.delivery_tag();
        report.received += 1;

        if delivery.redelivered() {
            debug!(worker_id = self.id, delivery_tag, "Processing redelivered message");
        }

        let payload = delivery.payload();
        let start = Instant::now();
        let result = AssertUnwindSafe(self.handler.handle(payload))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ProcessingError::Panicked(panic_message(panic))));
        self.metrics.record_duration(start.elapsed());

        let resolution = self.policy.resolution_for(result.as_ref().map(|_| ()));

        match &result {
            Ok(()) => {
                self.metrics.record_outcome(Outcome::Success);
                info!(
                    worker_id = self.id,
                    delivery_tag,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Message processed successfully"
                );
            }
            Err(e) => {
                self.metrics.record_outcome(Outcome::Error);
                error!(
                    worker_id = self.id,
                    delivery_tag,
                    error = %e,
                    category = %e.category(),
                    resolution = %resolution,
                    "Failed to process message"
                );
            }
        }

        match resolution {
            Resolution::Ack => report.acked += 1,
            Resolution::Nack { requeue } => {
                report.nacked += 1;
                if requeue {
                    report.requeued += 1;
                }
            }
        }

        if let Err(e) = resolution.apply(delivery).await {
            report.resolve_failures += 1;
            error!(worker_id = self.id, delivery_tag, error = %e, "Failed to resolve delivery");
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
