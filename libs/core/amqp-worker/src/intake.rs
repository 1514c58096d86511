//! Shared multi-consumer delivery intake.
//!
//! All workers of a pool pull from the same [`Intake`]. Each delivery is
//! handed to exactly one worker; there is no ordering guarantee across
//! workers.

use crate::error::AmqpError;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

struct IntakeState<D> {
    stream: BoxStream<'static, Result<D, AmqpError>>,
    closed: bool,
}

/// Cloneable handle to a shared stream of deliveries.
pub struct Intake<D> {
    state: Arc<Mutex<IntakeState<D>>>,
}

impl<D> Clone for Intake<D> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<D: Send + 'static> Intake<D> {
    /// Wrap a delivery stream.
    ///
    /// The first `Err` item closes the intake: the error is logged and every
    /// worker sees the intake as closed from then on.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<D, AmqpError>> + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(IntakeState {
                stream: stream.boxed(),
                closed: false,
            })),
        }
    }

    /// Build an intake fed by an in-process channel.
    ///
    /// The intake closes when every sender is dropped and the buffer drains.
    pub fn from_receiver(receiver: mpsc::Receiver<D>) -> Self {
        Self::new(ReceiverStream::new(receiver).map(Ok))
    }

    /// Wait for the next delivery; `None` once the intake is closed.
    ///
    /// Cancel-safe: dropping the future before it resolves loses no delivery.
    pub async fn recv(&self) -> Option<D> {
        let mut state = self.state.lock().await;
        if state.closed {
            return None;
        }

        match state.stream.next().await {
            Some(Ok(delivery)) => Some(delivery),
            Some(Err(e)) => {
                error!(error = %e, "Delivery stream failed, closing intake");
                state.closed = true;
                None
            }
            None => {
                debug!("Delivery stream ended");
                state.closed = true;
                None
            }
        }
    }
}
