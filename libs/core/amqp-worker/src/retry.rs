//! Bounded retry for connection setup.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay schedule between attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),
    /// Delay grows by `multiplier` after each retry, capped at `max`.
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: f64,
    },
}

impl Backoff {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let exp = attempt.saturating_sub(1) as i32;
                let millis = initial.as_millis() as f64 * multiplier.powi(exp);
                Duration::from_millis(millis as u64).min(*max)
            }
        }
    }
}

/// Retry configuration.
///
/// Defaults:
/// - max_attempts: 5
/// - backoff: fixed 5 seconds
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn exponential(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential {
                initial,
                max,
                multiplier: 2.0,
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(5, Duration::from_secs(5))
    }
}

/// Every attempt failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Run `operation` until it succeeds or the policy runs out of attempts.
///
/// The closure receives the 1-based attempt number. There is no sleep after
/// the final failed attempt.
///
/// # Example
/// ```ignore
/// let conn = retry_with_backoff(&RetryPolicy::default(), "broker", |_| async {
///     connector.dial(&url).await
/// })
/// .await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(target_name = label, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                warn!(
                    target_name = label,
                    attempt,
                    max_attempts,
                    error = %e,
                    "Giving up"
                );
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: e,
                });
            }
            Err(e) => {
                let delay = policy.backoff.delay_for(attempt);
                warn!(
                    target_name = label,
                    attempt,
                    max_attempts,
                    error = %e,
                    "Attempt failed, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
