//! File processor for the AMQP worker pool.
//!
//! This module provides the `FileProcessor` that implements `MessageHandler`,
//! decoding each payload and dispatching it to its processing action.

use amqp_worker::{MessageHandler, ProcessingError};
use async_trait::async_trait;
use tracing::info;

use crate::decoder::decode;
use crate::dispatcher::ActionDispatcher;
use crate::error::FileProcessingResult;

/// Decodes and dispatches file processing messages.
#[derive(Clone)]
pub struct FileProcessor {
    dispatcher: ActionDispatcher,
}

impl FileProcessor {
    pub fn new(dispatcher: ActionDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Processor backed by the simulated actions.
    pub fn simulated() -> Self {
        Self::new(ActionDispatcher::simulated())
    }

    /// Decode then dispatch one payload.
    pub async fn process_message(&self, payload: &[u8]) -> FileProcessingResult<()> {
        let message = decode(payload)?;

        info!(
            file_id = message.file_id,
            filename = %message.filename,
            project_id = %message.project_id,
            process_type = %message.process_type,
            "Processing file"
        );

        self.dispatcher.dispatch(&message).await
    }
}

#[async_trait]
impl MessageHandler for FileProcessor {
    async fn handle(&self, payload: &[u8]) -> Result<(), ProcessingError> {
        self.process_message(payload).await.map_err(Into::into)
    }

    fn name(&self) -> &'static str {
        "FileProcessor"
    }
}
