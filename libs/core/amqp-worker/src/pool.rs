//! Fixed-size worker pool with bounded graceful shutdown.

use crate::config::WorkerConfig;
use crate::delivery::Delivery;
use crate::handler::MessageHandler;
use crate::intake::Intake;
use crate::metrics::MetricsRecorder;
use crate::worker::{Worker, WorkerReport};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

/// Builds and starts a fixed number of workers sharing one intake.
///
/// # Example
///
/// ```rust,ignore
/// let pool = WorkerPool::new(WorkerConfig::default(), handler, PrometheusRecorder);
/// let mut running = pool.start(session.intake.clone());
///
/// tokio::select! {
///     _ = shutdown_signal() => {}
///     _ = running.stopped() => {}
/// }
///
/// let report = running.shutdown().await;
/// ```
pub struct WorkerPool<H, M> {
    config: WorkerConfig,
    handler: Arc<H>,
    metrics: Arc<M>,
}

impl<H, M> WorkerPool<H, M>
where
    H: MessageHandler,
    M: MetricsRecorder,
{
    pub fn new(config: WorkerConfig, handler: H, metrics: M) -> Self {
        Self::with_arc(config, Arc::new(handler), Arc::new(metrics))
    }

    /// Create a pool from shared handler and recorder.
    pub fn with_arc(config: WorkerConfig, handler: Arc<H>, metrics: Arc<M>) -> Self {
        Self {
            config,
            handler,
            metrics,
        }
    }

    pub fn size(&self) -> usize {
        self.config.worker_count
    }

    /// Spawn every worker on the current runtime.
    pub fn start<D: Delivery>(&self, intake: Intake<D>) -> RunningPool {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();

        for id in 0..self.config.worker_count {
            let worker = Worker::new(
                id,
                intake.clone(),
                shutdown_rx.clone(),
                Arc::clone(&self.handler),
                Arc::clone(&self.metrics),
                self.config.requeue_policy,
            );
            tasks.spawn(worker.run());
        }

        info!(
            workers = self.config.worker_count,
            handler = self.handler.name(),
            requeue_policy = %self.config.requeue_policy,
            "Worker pool started"
        );

        RunningPool {
            shutdown_tx,
            tasks,
            finished: Vec::with_capacity(self.config.worker_count),
            grace: self.config.shutdown_grace,
            size: self.config.worker_count,
        }
    }
}

/// Handle to a started pool.
pub struct RunningPool {
    shutdown_tx: watch::Sender<bool>,
    tasks: JoinSet<WorkerReport>,
    finished: Vec<WorkerReport>,
    grace: Duration,
    size: usize,
}

impl RunningPool {
    /// Signal every worker to stop. Idempotent.
    pub fn cancel(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Resolves once every worker has exited on its own.
    ///
    /// Cancel-safe, so it can sit in a `select!` next to a signal handler.
    pub async fn stopped(&mut self) {
        drain(&mut self.tasks, &mut self.finished).await;
    }

    /// Cancel, then wait up to the grace period for workers to finish.
    ///
    /// Workers still busy when the grace period ends are aborted; their
    /// unresolved deliveries return to the queue when the channel closes.
    pub async fn shutdown(mut self) -> ShutdownReport {
        let started = Instant::now();
        self.cancel();
        info!(grace_ms = self.grace.as_millis() as u64, "Shutting down worker pool");

        let drained = tokio::time::timeout(self.grace, drain(&mut self.tasks, &mut self.finished))
            .await
            .is_ok();

        let mut aborted = 0;
        if !drained {
            aborted = self.tasks.len();
            warn!(aborted, "Grace period elapsed, aborting remaining workers");
            self.tasks.abort_all();
            while let Some(result) = self.tasks.join_next().await {
                if let Err(e) = result {
                    if !e.is_cancelled() {
                        log_join_error(&e);
                    }
                }
            }
        }

        let mut workers = self.finished;
        workers.sort_by_key(|w| w.worker_id);

        let report = ShutdownReport {
            workers,
            aborted,
            elapsed: started.elapsed(),
        };

        info!(
            received = report.received(),
            acked = report.acked(),
            nacked = report.nacked(),
            aborted = report.aborted,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Worker pool stopped"
        );

        report
    }
}

async fn drain(tasks: &mut JoinSet<WorkerReport>, finished: &mut Vec<WorkerReport>) {
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(report) => finished.push(report),
            Err(e) => log_join_error(&e),
        }
    }
}

fn log_join_error(e: &JoinError) {
    error!(error = %e, "Worker task failed");
}

/// Outcome of [`RunningPool::shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    /// Reports of workers that finished, sorted by worker id
    pub workers: Vec<WorkerReport>,
    /// Workers aborted after the grace period
    pub aborted: usize,
    pub elapsed: Duration,
}

impl ShutdownReport {
    pub fn received(&self) -> u64 {
        self.workers.iter().map(|w| w.received).sum()
    }

    pub fn acked(&self) -> u64 {
        self.workers.iter().map(|w| w.acked).sum()
    }

    pub fn nacked(&self) -> u64 {
        self.workers.iter().map(|w| w.nacked).sum()
    }

    /// Every worker finished within the grace period.
    pub fn drained(&self) -> bool {
        self.aborted == 0
    }
}
