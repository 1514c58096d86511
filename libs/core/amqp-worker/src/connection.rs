//! Broker connection establishment with bounded retry.

use crate::error::AmqpError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use async_trait::async_trait;
use tracing::info;

/// Dials the broker once.
///
/// Production uses [`LapinConnector`](crate::LapinConnector); tests script
/// failures with their own implementation.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Send;

    async fn dial(&self, address: &str) -> Result<Self::Connection, AmqpError>;
}

/// Wraps a [`Connector`] with the startup retry policy.
pub struct ConnectionManager<C> {
    connector: C,
    retry: RetryPolicy,
}

impl<C: Connector> ConnectionManager<C> {
    /// Manager with the default policy: 5 attempts, 5 seconds apart.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Dial until success or the policy is exhausted.
    ///
    /// The address is never logged; it usually carries credentials.
    pub async fn connect(&self, address: &str) -> Result<C::Connection, AmqpError> {
        let connection = retry_with_backoff(&self.retry, "amqp", |attempt| {
            info!(attempt, max_attempts = self.retry.max_attempts, "Connecting to broker");
            self.connector.dial(address)
        })
        .await
        .map_err(|exhausted| AmqpError::ConnectionExhausted {
            attempts: exhausted.attempts,
            last_error: exhausted.last_error.to_string(),
        })?;

        info!("Connected to broker");
        Ok(connection)
    }
}
