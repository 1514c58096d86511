//! Error types for the AMQP worker.
//!
//! Two families live here:
//! - [`AmqpError`]: broker-side failures (setup, intake, ack/nack).
//! - [`ProcessingError`]: what a [`MessageHandler`](crate::MessageHandler) reports
//!   for a single message, categorized for the requeue policy.

use std::fmt;
use strum::Display;
use thiserror::Error;

/// Errors raised while talking to the broker.
#[derive(Debug, Error)]
pub enum AmqpError {
    /// Every dial attempt failed.
    #[error("failed to connect to broker after {attempts} attempts: {last_error}")]
    ConnectionExhausted { attempts: u32, last_error: String },

    /// A single dial attempt failed.
    #[error("dial error: {0}")]
    Dial(String),

    /// Channel could not be opened on the connection.
    #[error("failed to open channel: {0}")]
    ChannelFailure(String),

    /// Queue declaration was rejected.
    #[error("failed to declare queue '{queue}': {reason}")]
    DeclareFailure { queue: String, reason: String },

    /// Prefetch (basic.qos) could not be applied.
    #[error("failed to set QoS: {0}")]
    QosFailure(String),

    /// Consumer registration (basic.consume) failed.
    #[error("failed to register consumer on '{queue}': {reason}")]
    ConsumeFailure { queue: String, reason: String },

    /// The delivery stream reported an error.
    #[error("delivery stream error: {0}")]
    Intake(String),

    /// An ack or nack call failed.
    #[error("failed to {action} delivery {delivery_tag}: {reason}")]
    ResolveFailure {
        action: &'static str,
        delivery_tag: u64,
        reason: String,
    },
}

impl AmqpError {
    /// Build a resolution error from any displayable cause.
    pub fn resolve(action: &'static str, delivery_tag: u64, cause: impl fmt::Display) -> Self {
        Self::ResolveFailure {
            action,
            delivery_tag,
            reason: cause.to_string(),
        }
    }

    /// Setup-phase errors end the process; the rest are contained per message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AmqpError::ConnectionExhausted { .. }
                | AmqpError::Dial(_)
                | AmqpError::ChannelFailure(_)
                | AmqpError::DeclareFailure { .. }
                | AmqpError::QosFailure(_)
                | AmqpError::ConsumeFailure { .. }
        )
    }
}

/// Error categories drive the requeue policy.
///
/// - **Transient**: may succeed on redelivery (an action failed, a handler panicked)
/// - **Permanent**: will fail the same way every time (bad payload, unknown action)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Transient,
    Permanent,
}

/// Error returned by a handler for one message.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Temporary failure, worth another delivery.
    #[error("transient error: {message}")]
    Transient {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The message can never be processed as-is.
    #[error("permanent error: {message}")]
    Permanent {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The handler panicked; caught at the worker boundary.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl ProcessingError {
    /// Create a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transient error with a source.
    pub fn transient_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transient {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a permanent error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent {
            message: message.into(),
            source: None,
        }
    }

    /// Create a permanent error with a source.
    pub fn permanent_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Permanent {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProcessingError::Transient { .. } => ErrorCategory::Transient,
            ProcessingError::Permanent { .. } => ErrorCategory::Permanent,
            ProcessingError::Panicked(_) => ErrorCategory::Transient,
        }
    }
}
