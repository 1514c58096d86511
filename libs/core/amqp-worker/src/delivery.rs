//! Delivery abstraction and resolution decisions.

use crate::error::AmqpError;
use async_trait::async_trait;
use std::fmt;

/// A received message plus the capability to resolve it.
///
/// `ack` and `nack` take `self` by value, so a delivery can be resolved at
/// most once; the worker loop makes sure it is resolved at least once.
#[async_trait]
pub trait Delivery: Send + 'static {
    /// Raw message body.
    fn payload(&self) -> &[u8];

    /// Broker-assigned tag, unique per channel.
    fn delivery_tag(&self) -> u64;

    /// Whether the broker has delivered this message before.
    fn redelivered(&self) -> bool {
        false
    }

    /// Acknowledge this single delivery.
    async fn ack(self) -> Result<(), AmqpError>;

    /// Negatively acknowledge this single delivery.
    async fn nack(self, requeue: bool) -> Result<(), AmqpError>;
}

/// How a worker resolves a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Ack,
    Nack { requeue: bool },
}

impl Resolution {
    /// Apply this resolution to a delivery, consuming it.
    pub async fn apply<D: Delivery>(self, delivery: D) -> Result<(), AmqpError> {
        match self {
            Resolution::Ack => delivery.ack().await,
            Resolution::Nack { requeue } => delivery.nack(requeue).await,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Ack => write!(f, "ack"),
            Resolution::Nack { requeue: true } => write!(f, "nack+requeue"),
            Resolution::Nack { requeue: false } => write!(f, "nack"),
        }
    }
}
