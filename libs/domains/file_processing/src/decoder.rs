use crate::error::FileProcessingResult;
use crate::models::FileProcessingMessage;

/// Parse a raw payload into a [`FileProcessingMessage`].
///
/// Structural only: missing fields and malformed JSON fail here, an
/// unsupported `process_type` does not.
pub fn decode(payload: &[u8]) -> FileProcessingResult<FileProcessingMessage> {
    Ok(serde_json::from_slice(payload)?)
}
