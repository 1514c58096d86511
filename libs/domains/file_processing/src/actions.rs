//! Processing actions, one per [`ProcessType`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::error::FileProcessingResult;
use crate::models::{FileProcessingMessage, ProcessType};

/// A unit of work run for one message.
///
/// Implementations must terminate; the worker has no per-message timeout.
#[async_trait]
pub trait FileAction: Send + Sync {
    fn kind(&self) -> ProcessType;

    async fn run(&self, message: &FileProcessingMessage) -> FileProcessingResult<()>;
}

impl ProcessType {
    /// Latency of the simulated action.
    pub const fn simulated_latency(&self) -> Duration {
        match self {
            ProcessType::Validate => Duration::from_millis(100),
            ProcessType::Transform => Duration::from_millis(500),
            ProcessType::Analyze => Duration::from_millis(300),
        }
    }
}

/// Stand-in for real file work: logs and sleeps for a fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedAction {
    kind: ProcessType,
    latency: Duration,
}

impl SimulatedAction {
    pub fn new(kind: ProcessType) -> Self {
        Self {
            kind,
            latency: kind.simulated_latency(),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl FileAction for SimulatedAction {
    fn kind(&self) -> ProcessType {
        self.kind
    }

    async fn run(&self, message: &FileProcessingMessage) -> FileProcessingResult<()> {
        let verb = match self.kind {
            ProcessType::Validate => "Validating",
            ProcessType::Transform => "Transforming",
            ProcessType::Analyze => "Analyzing",
        };
        info!(filename = %message.filename, "{} file", verb);

        tokio::time::sleep(self.latency).await;
        Ok(())
    }
}
