//! Prometheus metrics for AMQP workers.
//!
//! Workers never touch the global recorder directly; they receive a
//! [`MetricsRecorder`] so tests can count outcomes in memory.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use strum::{AsRefStr, Display};
use tracing::info;

/// Counter of processed messages, labelled by `status`.
pub const MESSAGES_PROCESSED: &str = "messages_processed_total";

/// Histogram of decode + dispatch time.
pub const PROCESSING_DURATION: &str = "message_processing_duration_seconds";

/// Prometheus client default buckets.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Processing outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Success,
    Error,
}

/// Sink for per-message measurements.
pub trait MetricsRecorder: Send + Sync + 'static {
    fn record_outcome(&self, outcome: Outcome);

    fn record_duration(&self, duration: Duration);
}

/// Recorder backed by the global `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusRecorder;

impl MetricsRecorder for PrometheusRecorder {
    fn record_outcome(&self, outcome: Outcome) {
        counter!(MESSAGES_PROCESSED, "status" => outcome.as_ref().to_string()).increment(1);
    }

    fn record_duration(&self, duration: Duration) {
        histogram!(PROCESSING_DURATION).record(duration.as_secs_f64());
    }
}

/// Install the Prometheus recorder.
///
/// Call this once at startup. Subsequent calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    PROMETHEUS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(PROCESSING_DURATION.to_string()),
                DURATION_BUCKETS,
            )?
            .install_recorder()?;

        register_metric_descriptions();
        info!("Prometheus metrics recorder initialized");

        Ok(handle)
    })
}

/// Get the Prometheus handle (None until [`init_metrics`] ran)
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> Option<String> {
    prometheus_handle().map(|h| h.render())
}

fn register_metric_descriptions() {
    describe_counter!(
        MESSAGES_PROCESSED,
        "Total number of processed messages by status"
    );
    describe_histogram!(
        PROCESSING_DURATION,
        metrics::Unit::Seconds,
        "Time spent decoding and dispatching a message"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Success.as_ref(), "success");
        assert_eq!(Outcome::Error.to_string(), "error");
    }

    #[test]
    fn test_recorder_is_noop_without_exporter() {
        let recorder = PrometheusRecorder;
        recorder.record_outcome(Outcome::Success);
        recorder.record_duration(Duration::from_millis(10));
    }
}
