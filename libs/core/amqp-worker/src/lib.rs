//! AMQP Worker Framework
//!
//! Consumes a single durable RabbitMQ queue with a fixed pool of workers.
//!
//! ## Features
//!
//! - **Bounded connect retry**: fixed or exponential backoff, fatal on exhaustion
//! - **Prefetch 1, manual ack**: at most one unacknowledged delivery per consumer
//! - **Worker pool**: N peers pulling from one shared intake
//! - **Requeue policy**: requeue everything, or reject permanent failures
//! - **Graceful shutdown**: cooperative cancellation with a bounded grace period
//! - **Prometheus metrics** and **health endpoints**
//!
//! ## Architecture
//!
//! ```text
//! ConnectionManager ──▶ open_consumer ──▶ Intake ──┬──▶ Worker 0 ──▶ ack / nack
//!   (retry policy)      (declare, qos,    (shared) ├──▶ Worker 1 ──▶ ack / nack
//!                        consume)                  └──▶ Worker N ──▶ ack / nack
//!                                                        ▲
//!                          RunningPool::cancel ──────────┘ watch<bool>
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use amqp_worker::{
//!     open_consumer, ConnectionManager, LapinConnector, PrometheusRecorder, QueueConfig,
//!     WorkerConfig, WorkerPool,
//! };
//!
//! let connection = ConnectionManager::new(LapinConnector::new())
//!     .connect(&url)
//!     .await?;
//! let session = open_consumer(connection, &QueueConfig::new("jobs")).await?;
//!
//! let pool = WorkerPool::new(WorkerConfig::default(), MyHandler, PrometheusRecorder);
//! let running = pool.start(session.intake.clone());
//!
//! shutdown_signal().await;
//! let report = running.shutdown().await;
//! session.close().await;
//! ```

mod amqp;
mod config;
mod connection;
mod delivery;
mod error;
mod handler;
mod health;
mod intake;
pub mod metrics;
mod pool;
mod retry;
mod worker;

// Re-export main types
pub use amqp::{open_consumer, AmqpDelivery, ConsumerSession, LapinConnector, PREFETCH_COUNT};
pub use config::{
    QueueConfig, RequeuePolicy, WorkerConfig, DEFAULT_SHUTDOWN_GRACE, DEFAULT_WORKER_COUNT,
};
pub use connection::{ConnectionManager, Connector};
pub use delivery::{Delivery, Resolution};
pub use error::{AmqpError, ErrorCategory, ProcessingError};
pub use handler::MessageHandler;
pub use health::{health_router, metrics_router, HealthResponse, HealthState, ReadyResponse};
pub use intake::Intake;
pub use pool::{RunningPool, ShutdownReport, WorkerPool};
pub use retry::{retry_with_backoff, Backoff, Exhausted, RetryPolicy};
pub use worker::{ExitReason, WorkerReport};

// Path-qualified: the `metrics` crate shares the module's name
pub use crate::metrics::{init_metrics, MetricsRecorder, Outcome, PrometheusRecorder};
