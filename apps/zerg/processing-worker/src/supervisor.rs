//! Runs the worker pool until a shutdown signal or until its intake closes.

use amqp_worker::{Delivery, Intake, MessageHandler, MetricsRecorder, ShutdownReport, WorkerPool};
use eyre::{eyre, Result};
use std::future::Future;
use tracing::{info, warn};

/// Why the pool was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    Signal,
    IntakeClosed,
}

/// Start `pool` on `intake` and block until `shutdown` resolves or every
/// worker has exited on its own.
///
/// The pool is always shut down before returning. Losing the intake is an
/// error so the process exits non-zero and gets restarted.
pub async fn supervise<H, M, D, S>(
    pool: WorkerPool<H, M>,
    intake: Intake<D>,
    shutdown: S,
) -> Result<ShutdownReport>
where
    H: MessageHandler,
    M: MetricsRecorder,
    D: Delivery,
    S: Future<Output = ()>,
{
    let mut running = pool.start(intake);

    let cause = tokio::select! {
        _ = shutdown => StopCause::Signal,
        _ = running.stopped() => StopCause::IntakeClosed,
    };

    if cause == StopCause::IntakeClosed {
        warn!("All workers stopped, shutting down");
    }

    let report = running.shutdown().await;
    if !report.drained() {
        warn!(
            aborted = report.aborted,
            "Workers still busy after the grace period were aborted"
        );
    }

    match cause {
        StopCause::Signal => {
            info!(received = report.received(), "Worker pool drained");
            Ok(report)
        }
        StopCause::IntakeClosed => Err(eyre!(
            "delivery intake closed unexpectedly after {} messages",
            report.received()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amqp_worker::{ProcessingError, Resolution, WorkerConfig};
    use async_trait::async_trait;
    use std::time::Duration;
    use test_utils::{MemoryDelivery, MemoryRecorder, ResolutionLog};
    use tokio::sync::mpsc;

    struct AcceptAll;

    #[async_trait]
    impl MessageHandler for AcceptAll {
        async fn handle(&self, _payload: &[u8]) -> Result<(), ProcessingError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "accept-all"
        }
    }

    fn pool() -> WorkerPool<AcceptAll, MemoryRecorder> {
        WorkerPool::new(WorkerConfig::default(), AcceptAll, MemoryRecorder::new())
    }

    #[tokio::test]
    async fn test_closed_intake_is_an_error() {
        let log = ResolutionLog::new();
        let (tx, rx) = mpsc::channel(4);
        for tag in 1..=3 {
            tx.send(MemoryDelivery::new(tag, "{}", &log)).await.unwrap();
        }
        drop(tx);

        let result = supervise(
            pool(),
            Intake::from_receiver(rx),
            std::future::pending::<()>(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("intake closed"), "{err}");
        assert!(err.to_string().contains("after 3 messages"), "{err}");
        assert_eq!(log.count(Resolution::Ack), 3);
    }

    #[tokio::test]
    async fn test_signal_is_a_clean_stop() {
        let log = ResolutionLog::new();
        let (tx, rx) = mpsc::channel(4);
        tx.send(MemoryDelivery::new(1, "{}", &log)).await.unwrap();

        let report = supervise(
            pool(),
            Intake::from_receiver(rx),
            tokio::time::sleep(Duration::from_millis(30)),
        )
        .await
        .unwrap();

        assert!(report.drained());
        assert_eq!(report.received(), 1);
        assert_eq!(log.for_tag(1), vec![Resolution::Ack]);
        drop(tx);
    }
}
