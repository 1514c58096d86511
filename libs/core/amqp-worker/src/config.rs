//! Worker pool and queue configuration.

use crate::delivery::Resolution;
use crate::error::{ErrorCategory, ProcessingError};
use std::time::Duration;
use strum::{Display, EnumString};

/// Default number of workers in a pool.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Default upper bound on how long shutdown waits for workers.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Decides the requeue flag for a failed delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum RequeuePolicy {
    /// Every failure goes back on the queue.
    #[default]
    Always,
    /// Permanent failures are rejected (dead-lettered if the queue has a
    /// dead-letter exchange); transient ones are requeued.
    RejectPermanent,
}

impl RequeuePolicy {
    /// Resolution for a handler outcome.
    pub fn resolution_for(&self, outcome: Result<(), &ProcessingError>) -> Resolution {
        match (self, outcome) {
            (_, Ok(())) => Resolution::Ack,
            (RequeuePolicy::Always, Err(_)) => Resolution::Nack { requeue: true },
            (RequeuePolicy::RejectPermanent, Err(e)) => Resolution::Nack {
                requeue: e.category() == ErrorCategory::Transient,
            },
        }
    }
}

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of workers; fixed for the pool's lifetime
    pub worker_count: usize,

    /// How long shutdown waits for in-flight work
    pub shutdown_grace: Duration,

    pub requeue_policy: RequeuePolicy,
}

impl WorkerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count (at least 1)
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn with_requeue_policy(mut self, policy: RequeuePolicy) -> Self {
        self.requeue_policy = policy;
        self
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            requeue_policy: RequeuePolicy::default(),
        }
    }
}

/// Queue topology for the consumer.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Durable queue to declare and consume from
    pub queue_name: String,

    /// Consumer tag; empty lets the broker generate one
    pub consumer_tag: String,

    /// Sets the `x-dead-letter-exchange` queue argument when present
    pub dead_letter_exchange: Option<String>,
}

impl QueueConfig {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            consumer_tag: String::new(),
            dead_letter_exchange: None,
        }
    }

    pub fn with_dead_letter_exchange(mut self, exchange: Option<String>) -> Self {
        self.dead_letter_exchange = exchange.filter(|e| !e.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_worker_config_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.worker_count, 5);
        assert_eq!(config.shutdown_grace, Duration::from_secs(2));
        assert_eq!(config.requeue_policy, RequeuePolicy::Always);
    }

    #[test]
    fn test_worker_count_floor() {
        assert_eq!(WorkerConfig::new().with_worker_count(0).worker_count, 1);
    }

    #[test]
    fn test_requeue_policy_parse() {
        assert_eq!(
            RequeuePolicy::from_str("always").unwrap(),
            RequeuePolicy::Always
        );
        assert_eq!(
            RequeuePolicy::from_str("reject-permanent").unwrap(),
            RequeuePolicy::RejectPermanent
        );
        assert!(RequeuePolicy::from_str("never").is_err());
        assert_eq!(RequeuePolicy::RejectPermanent.to_string(), "reject-permanent");
    }

    #[test]
    fn test_always_requeues_every_failure() {
        let policy = RequeuePolicy::Always;
        assert_eq!(policy.resolution_for(Ok(())), Resolution::Ack);
        assert_eq!(
            policy.resolution_for(Err(&ProcessingError::permanent("bad json"))),
            Resolution::Nack { requeue: true }
        );
        assert_eq!(
            policy.resolution_for(Err(&ProcessingError::transient("io"))),
            Resolution::Nack { requeue: true }
        );
    }

    #[test]
    fn test_reject_permanent() {
        let policy = RequeuePolicy::RejectPermanent;
        assert_eq!(
            policy.resolution_for(Err(&ProcessingError::permanent("bad json"))),
            Resolution::Nack { requeue: false }
        );
        assert_eq!(
            policy.resolution_for(Err(&ProcessingError::Panicked("boom".into()))),
            Resolution::Nack { requeue: true }
        );
    }

    #[test]
    fn test_empty_dead_letter_exchange_is_ignored() {
        let queue = QueueConfig::new("jobs").with_dead_letter_exchange(Some(String::new()));
        assert!(queue.dead_letter_exchange.is_none());
        assert!(queue.consumer_tag.is_empty());
    }
}
