//! Handler trait invoked by every worker for every delivery.

use crate::error::ProcessingError;
use async_trait::async_trait;

/// Message handler trait.
///
/// Implement this to plug business logic into the worker pool. The handler
/// receives the raw payload; decoding is the handler's job so that malformed
/// payloads surface as [`ProcessingError`]s and are resolved like any other
/// failure.
///
/// Handlers must terminate: the pool has no per-message timeout, so a
/// handler that never returns stalls its worker for good.
///
/// # Example
///
/// ```rust,ignore
/// use amqp_worker::{MessageHandler, ProcessingError};
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl MessageHandler for Echo {
///     async fn handle(&self, payload: &[u8]) -> Result<(), ProcessingError> {
///         let text = std::str::from_utf8(payload)
///             .map_err(|e| ProcessingError::permanent_with_source("not utf-8", e))?;
///         tracing::info!(%text, "echo");
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "echo"
///     }
/// }
/// ```
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// Process one payload.
    ///
    /// * `Ok(())` - the delivery is acknowledged
    /// * `Err(ProcessingError)` - the delivery is negatively acknowledged;
    ///   the [`RequeuePolicy`](crate::RequeuePolicy) decides the requeue flag
    async fn handle(&self, payload: &[u8]) -> Result<(), ProcessingError>;

    /// Handler name for logs.
    fn name(&self) -> &'static str;
}
