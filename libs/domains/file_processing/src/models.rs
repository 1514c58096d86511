use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A file processing request as published on the queue.
///
/// Every field is required. `process_type` is kept as the raw string so
/// that an unsupported action is reported by the dispatcher, not the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProcessingMessage {
    pub file_id: i64,
    pub filename: String,
    pub s3_key: String,
    pub s3_bucket: String,
    pub project_id: String,
    pub process_type: String,
    pub timestamp: DateTime<Utc>,
}

impl FileProcessingMessage {
    /// Parse the action kind; `None` for anything outside the known set.
    pub fn process_kind(&self) -> Option<ProcessType> {
        self.process_type.parse().ok()
    }
}

/// Supported processing actions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ProcessType {
    Validate,
    Transform,
    Analyze,
}
