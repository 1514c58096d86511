use amqp_worker::{ErrorCategory, ProcessingError};
use thiserror::Error;

use crate::models::ProcessType;

#[derive(Debug, Error)]
pub enum FileProcessingError {
    #[error("failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown process type: {0}")]
    UnknownActionKind(String),

    #[error("{kind} failed: {reason}")]
    ActionFailure { kind: ProcessType, reason: String },
}

pub type FileProcessingResult<T> = Result<T, FileProcessingError>;

impl FileProcessingError {
    /// Bad payloads and unknown actions never succeed on redelivery.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FileProcessingError::Decode(_) | FileProcessingError::UnknownActionKind(_) => {
                ErrorCategory::Permanent
            }
            FileProcessingError::ActionFailure { .. } => ErrorCategory::Transient,
        }
    }
}

impl From<FileProcessingError> for ProcessingError {
    fn from(err: FileProcessingError) -> Self {
        let message = err.to_string();
        match err.category() {
            ErrorCategory::Permanent => ProcessingError::permanent_with_source(message, err),
            ErrorCategory::Transient => ProcessingError::transient_with_source(message, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let decode = serde_json::from_slice::<u8>(b"{").unwrap_err();
        assert_eq!(
            FileProcessingError::from(decode).category(),
            ErrorCategory::Permanent
        );
        assert_eq!(
            FileProcessingError::UnknownActionKind("x".into()).category(),
            ErrorCategory::Permanent
        );
        assert_eq!(
            FileProcessingError::ActionFailure {
                kind: ProcessType::Transform,
                reason: "disk full".into(),
            }
            .category(),
            ErrorCategory::Transient
        );
    }

    #[test]
    fn test_into_processing_error_keeps_message() {
        let err: ProcessingError = FileProcessingError::UnknownActionKind("resize".into()).into();
        assert_eq!(err.category(), ErrorCategory::Permanent);
        assert!(err.to_string().contains("unknown process type: resize"));
    }
}
