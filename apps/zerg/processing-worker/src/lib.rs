//! Processing Worker Service
//!
//! Consumes file processing requests from a RabbitMQ queue and runs the
//! requested action on a fixed pool of workers.
//!
//! ## Architecture
//!
//! ```text
//! RabbitMQ queue (aec-data-processing, prefetch 1, manual ack)
//!   ↓
//! WorkerPool (5 workers, shared intake)
//!   ↓ (decode + dispatch)
//! FileProcessor → validate / transform / analyze
//!   ↓
//! ack, or nack + requeue
//! ```
//!
//! ## Features
//!
//! - Connection retry: 5 attempts, 5 seconds apart
//! - Graceful shutdown on SIGINT / SIGTERM with a bounded grace period
//! - Prometheus metrics on `METRICS_PORT`
//! - Health endpoints on `HEALTH_PORT`
//! - `DISABLE_RABBITMQ=1` serves health and metrics only

pub mod config;
pub mod shutdown;
pub mod supervisor;

use amqp_worker::{
    health_router, init_metrics, metrics_router, open_consumer, ConnectionManager, HealthState,
    LapinConnector, PrometheusRecorder, RequeuePolicy, WorkerPool,
};
use axum::Router;
use core_config::{Environment, FromEnv};
use domain_file_processing::FileProcessor;
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{ServiceConfig, SERVICE_NAME, WORKER_COUNT};
use crate::shutdown::shutdown_signal;
use crate::supervisor::supervise;

/// Bind `port` and serve `app` in the background.
///
/// Binding happens before returning so a taken port fails startup.
async fn spawn_server(name: &'static str, port: u16, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {} server to {}", name, addr))?;

    info!(port = %port, "Starting {} server", name);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "{} server failed", name);
        }
    });

    Ok(())
}

/// Run the processing worker
///
/// This is the main entry point for the worker. It:
/// 1. Sets up error reports, structured logging and metrics
/// 2. Starts the metrics and health servers
/// 3. Connects to RabbitMQ with retry and starts the worker pool
/// 4. Waits for a shutdown signal, then drains the pool
///
/// The delivery stream ending on its own (broker gone) drains the pool and
/// returns an error.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - A server port cannot be bound
/// - RabbitMQ stays unreachable after every retry
/// - Queue declaration, QoS or consumer registration fails
/// - The delivery stream closes before a shutdown signal
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let config = ServiceConfig::from_env().wrap_err("Failed to load configuration")?;
    init_metrics().wrap_err("Failed to install Prometheus recorder")?;

    info!(
        service = SERVICE_NAME,
        queue = %config.queue_name,
        workers = WORKER_COUNT,
        "Starting data processing service"
    );
    info!("Environment: {:?}", environment);

    spawn_server("metrics", config.metrics_port, metrics_router()).await?;
    spawn_server(
        "health",
        config.health_port,
        health_router(HealthState::new(SERVICE_NAME)),
    )
    .await?;

    if !config.rabbitmq_enabled {
        warn!("RabbitMQ disabled (DISABLE_RABBITMQ=1), serving health and metrics only");
        shutdown_signal().await;
        info!("Data processing service stopped");
        return Ok(());
    }

    let connection = ConnectionManager::new(LapinConnector::new())
        .connect(&config.rabbitmq_url)
        .await
        .wrap_err("Failed to connect to RabbitMQ")?;

    let session = open_consumer(connection, &config.queue_config())
        .await
        .wrap_err_with(|| format!("Failed to start consuming from '{}'", config.queue_name))?;

    if config.requeue_policy != RequeuePolicy::Always {
        warn!(
            requeue_policy = %config.requeue_policy,
            dead_letter_exchange = ?config.dead_letter_exchange,
            "Permanent failures will be rejected instead of requeued"
        );
    }

    let pool = WorkerPool::new(
        config.worker_config(),
        FileProcessor::simulated(),
        PrometheusRecorder,
    );
    let outcome = supervise(pool, session.intake.clone(), shutdown_signal()).await;

    session.close().await;
    outcome?;

    info!("Data processing service stopped");
    Ok(())
}
