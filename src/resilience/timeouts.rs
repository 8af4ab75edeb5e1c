//! Per-attempt timeout enforcement.
//!
//! # Responsibilities
//! - Bound every provider attempt by the configured duration
//! - Report an elapsed deadline as [`PolicyError::Timeout`]
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Pessimistic strategy runs the attempt on its own task. At the deadline
//!   the caller is released at once and the task is aborted, so a timed-out
//!   attempt stops at its next await point instead of running to completion
//! - The attempt task is also aborted when the caller itself is cancelled
//! - Optimistic strategy drops (cancels) the attempt future inline at the deadline

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::TimeoutStrategy;
use crate::resilience::PolicyError;

/// Deadline applied to a single attempt.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    duration: Duration,
    strategy: TimeoutStrategy,
}

impl TimeoutPolicy {
    pub fn new(duration: Duration, strategy: TimeoutStrategy) -> Self {
        Self { duration, strategy }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn strategy(&self) -> TimeoutStrategy {
        self.strategy
    }

    /// Run one attempt under the deadline.
    pub async fn run<T, E, Fut>(&self, attempt: Fut) -> Result<T, PolicyError<E>>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        match self.strategy {
            TimeoutStrategy::Optimistic => match time::timeout(self.duration, attempt).await {
                Ok(result) => result.map_err(PolicyError::Inner),
                Err(_) => Err(PolicyError::Timeout(self.duration)),
            },
            TimeoutStrategy::Pessimistic => {
                let mut task = AttemptTask(tokio::spawn(attempt));
                match time::timeout(self.duration, &mut task.0).await {
                    Ok(Ok(result)) => result.map_err(PolicyError::Inner),
                    Ok(Err(join_error)) => Err(PolicyError::Aborted(join_error.to_string())),
                    Err(_) => {
                        tracing::debug!(
                            timeout_ms = self.duration.as_millis() as u64,
                            "Attempt exceeded deadline, aborting"
                        );
                        task.0.abort();
                        Err(PolicyError::Timeout(self.duration))
                    }
                }
            }
        }
    }
}

/// Spawned attempt, aborted when dropped.
struct AttemptTask<T>(JoinHandle<T>);

impl<T> Drop for AttemptTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
