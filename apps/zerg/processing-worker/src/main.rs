//! Processing Worker Service - Entry Point
//!
//! Consumes file processing requests from RabbitMQ.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    zerg_processing_worker::run().await
}
