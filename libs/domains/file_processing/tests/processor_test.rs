//! Processor tests for the file processing domain
//!
//! These cover the path a queue payload takes through `FileProcessor`:
//! - decoding failures surface before any dispatch
//! - unknown process types are rejected by name
//! - the simulated actions finish within their latency budget
//! - the processor resolves deliveries correctly inside a worker pool

use test_utils::{MemoryDelivery, MemoryRecorder, ResolutionLog};
use amqp_worker::{
    ErrorCategory, Intake, MessageHandler, RequeuePolicy, Resolution, WorkerConfig, WorkerPool,
};
use domain_file_processing::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

fn payload(process_type: &str) -> Vec<u8> {
    format!(
        r#"{{"file_id":1,"filename":"a.dwg","s3_key":"k","s3_bucket":"b","project_id":"p","process_type":"{process_type}","timestamp":"2026-01-01T00:00:00Z"}}"#
    )
    .into_bytes()
}

/// Simulated actions with no latency, for pool tests.
fn instant_processor() -> FileProcessor {
    let dispatcher = [
        ProcessType::Validate,
        ProcessType::Transform,
        ProcessType::Analyze,
    ]
    .into_iter()
    .fold(ActionDispatcher::new(), |d, kind| {
        d.with_action(SimulatedAction::new(kind).with_latency(Duration::ZERO))
    });
    FileProcessor::new(dispatcher)
}

#[tokio::test]
async fn test_validate_succeeds_under_500ms() {
    let processor = FileProcessor::simulated();

    let started = Instant::now();
    processor.process_message(&payload("validate")).await.unwrap();

    assert!(started.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn test_every_known_kind_succeeds() {
    let processor = instant_processor();
    for kind in ["validate", "transform", "analyze"] {
        processor.process_message(&payload(kind)).await.unwrap();
    }
}

#[tokio::test]
async fn test_unknown_kind_names_the_kind() {
    let err = FileProcessor::simulated()
        .process_message(&payload("unknown"))
        .await
        .unwrap_err();

    assert!(matches!(err, FileProcessingError::UnknownActionKind(_)));
    assert!(err.to_string().contains("unknown"));
}

#[tokio::test]
async fn test_malformed_payload_fails_before_dispatch() {
    // An empty dispatcher would reject any dispatched message as unknown,
    // so a Decode error proves dispatch never ran.
    let processor = FileProcessor::new(ActionDispatcher::new());

    let err = processor.process_message(b"{not json").await.unwrap_err();
    assert!(matches!(err, FileProcessingError::Decode(_)));

    let err = processor.process_message(&payload("validate")).await.unwrap_err();
    assert!(matches!(err, FileProcessingError::UnknownActionKind(_)));
}

#[tokio::test]
async fn test_handler_errors_are_categorized() {
    let processor = instant_processor();

    let decode = processor.handle(b"garbage").await.unwrap_err();
    assert_eq!(decode.category(), ErrorCategory::Permanent);

    let unknown = processor.handle(&payload("resize")).await.unwrap_err();
    assert_eq!(unknown.category(), ErrorCategory::Permanent);

    assert!(processor.handle(&payload("analyze")).await.is_ok());
}

#[tokio::test]
async fn test_pool_acks_valid_and_requeues_invalid() {
    let log = ResolutionLog::new();
    let (tx, rx) = mpsc::channel(8);
    let kinds = ["validate", "transform", "analyze", "unknown"];
    for (i, kind) in kinds.iter().enumerate() {
        tx.send(MemoryDelivery::new(i as u64 + 1, payload(kind), &log))
            .await
            .unwrap();
    }
    tx.send(MemoryDelivery::new(5, "{", &log)).await.unwrap();
    drop(tx);

    let recorder = Arc::new(MemoryRecorder::new());
    let mut running = WorkerPool::with_arc(
        WorkerConfig::default(),
        Arc::new(instant_processor()),
        recorder.clone(),
    )
    .start(Intake::from_receiver(rx));
    running.stopped().await;
    let report = running.shutdown().await;

    assert_eq!(report.received(), 5);
    for tag in 1..=3 {
        assert_eq!(log.for_tag(tag), vec![Resolution::Ack]);
    }
    assert_eq!(log.for_tag(4), vec![Resolution::Nack { requeue: true }]);
    assert_eq!(log.for_tag(5), vec![Resolution::Nack { requeue: true }]);
    assert_eq!(recorder.successes(), 3);
    assert_eq!(recorder.errors(), 2);
}

#[tokio::test]
async fn test_reject_permanent_dead_letters_poison_messages() {
    let log = ResolutionLog::new();
    let (tx, rx) = mpsc::channel(2);
    tx.send(MemoryDelivery::new(1, payload("unknown"), &log))
        .await
        .unwrap();
    tx.send(MemoryDelivery::new(2, "{", &log)).await.unwrap();
    drop(tx);

    let mut running = WorkerPool::new(
        WorkerConfig::default().with_requeue_policy(RequeuePolicy::RejectPermanent),
        instant_processor(),
        MemoryRecorder::new(),
    )
    .start(Intake::from_receiver(rx));
    running.stopped().await;
    running.shutdown().await;

    assert_eq!(log.count(Resolution::Nack { requeue: false }), 2);
}

#[tokio::test]
async fn test_cancel_mid_stream_over_mixed_kinds() {
    let log = ResolutionLog::new();
    let (tx, rx) = mpsc::channel(100);
    let kinds = ["validate", "transform", "analyze"];
    for i in 0..100u64 {
        let kind = kinds[(i % 3) as usize];
        tx.send(MemoryDelivery::new(i + 1, payload(kind), &log))
            .await
            .unwrap();
    }

    let dispatcher = [
        ProcessType::Validate,
        ProcessType::Transform,
        ProcessType::Analyze,
    ]
    .into_iter()
    .fold(ActionDispatcher::new(), |d, kind| {
        d.with_action(SimulatedAction::new(kind).with_latency(Duration::from_millis(5)))
    });
    let running = WorkerPool::new(
        WorkerConfig::default(),
        FileProcessor::new(dispatcher),
        MemoryRecorder::new(),
    )
    .start(Intake::from_receiver(rx));

    tokio::time::sleep(Duration::from_millis(25)).await;
    let report = running.shutdown().await;
    let resolved = log.len();

    assert!(report.drained());
    assert_eq!(resolved as u64, report.received());
    assert_eq!(log.count(Resolution::Ack), resolved);
    assert!(resolved < 100);
    for tag in 1..=100 {
        assert!(log.for_tag(tag).len() <= 1);
    }

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(log.len(), resolved);
    drop(tx);
}
