//! Composed resilience pipeline.
//!
//! Every call runs through the same fixed chain:
//!
//! ```text
//! bulkhead( retry( circuit_breaker( timeout( operation ) ) ) )
//! ```
//!
//! The bulkhead is outermost so a rejected call consumes neither a retry nor
//! a timeout budget. Policy state is created once from [`PolicyConfig`] and
//! shared by every call made through the same instance.

use serde::Serialize;
use std::fmt::Display;
use std::future::Future;

use crate::config::{PolicyConfig, TimeoutStrategy};
use crate::observability::metrics;
use crate::resilience::bulkhead::BulkheadPermit;
use crate::resilience::{
    Bulkhead, CircuitBreaker, CircuitState, PolicyError, RetryPolicy, TimeoutPolicy,
};

/// Point-in-time view of the pipeline state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySnapshot {
    pub name: String,
    pub circuit_state: CircuitState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    pub break_duration_ms: u64,
    pub in_flight: usize,
    pub queued: usize,
    pub max_parallel: usize,
    pub max_queued: usize,
    pub retry_count: u32,
    pub timeout_ms: u64,
    pub timeout_strategy: TimeoutStrategy,
}

/// Retry, circuit breaker, timeout and bulkhead composed around one operation.
#[derive(Debug)]
pub struct ResiliencePolicy {
    name: String,
    bulkhead: Bulkhead,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
    timeout: TimeoutPolicy,
}

impl ResiliencePolicy {
    /// Build the pipeline from configuration.
    ///
    /// The breaker opens after `retry_count + 1` consecutive failures, i.e. one
    /// fully exhausted logical call.
    pub fn from_config(name: impl Into<String>, config: &PolicyConfig) -> Self {
        let name = name.into();
        Self {
            bulkhead: Bulkhead::new(config.max_parallel, config.max_queued),
            retry: RetryPolicy::with_backoff(
                config.retry_count,
                config.retry_base_delay_ms,
                config.retry_max_delay_ms,
            ),
            breaker: CircuitBreaker::new(
                name.clone(),
                config.retry_count.saturating_add(1),
                config.break_duration(),
            ),
            timeout: TimeoutPolicy::new(config.timeout(), config.timeout_strategy),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute `operation` through the whole pipeline.
    ///
    /// `operation` is called once per attempt and must produce a fresh future each
    /// time. It is not called when the breaker rejects the attempt.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, PolicyError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        let ticket = match self.bulkhead.try_enter() {
            Ok(ticket) => ticket,
            Err(rejected) => {
                tracing::warn!(policy = %self.name, error = %rejected, "Call rejected by bulkhead");
                metrics::record_bulkhead_rejection(&self.name);
                return Err(PolicyError::CapacityExceeded);
            }
        };
        let permit = ticket
            .ready()
            .await
            .map_err(|_| PolicyError::CapacityExceeded)?;
        let _slot = TrackedSlot::new(self, permit);

        let result = self
            .retry
            .run(|attempt| {
                let admitted = match self.breaker.try_acquire() {
                    Some(permit) => Ok((permit, operation())),
                    None => Err(PolicyError::CircuitOpen),
                };
                async move {
                    let (permit, call) = admitted.inspect_err(|_| {
                        tracing::debug!(policy = %self.name, attempt, "Circuit open, failing fast");
                    })?;
                    let outcome = self.timeout.run(call).await;
                    match &outcome {
                        Ok(_) => {
                            permit.succeed();
                            metrics::record_attempt(&self.name, "success");
                        }
                        Err(err) => {
                            permit.fail();
                            metrics::record_attempt(&self.name, err.kind());
                        }
                    }
                    outcome
                }
            })
            .await;

        metrics::record_circuit_state(&self.name, self.breaker.state());
        result
    }

    /// Current breaker and bulkhead state.
    pub fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            name: self.name.clone(),
            circuit_state: self.breaker.state(),
            consecutive_failures: self.breaker.consecutive_failures(),
            failure_threshold: self.breaker.failure_threshold(),
            break_duration_ms: self.breaker.break_duration().as_millis() as u64,
            in_flight: self.bulkhead.in_flight(),
            queued: self.bulkhead.queued(),
            max_parallel: self.bulkhead.max_parallel(),
            max_queued: self.bulkhead.max_queued(),
            retry_count: self.retry.retry_count(),
            timeout_ms: self.timeout.duration().as_millis() as u64,
            timeout_strategy: self.timeout.strategy(),
        }
    }
}

/// Execution slot that keeps the in-flight gauge current on both edges.
///
/// The gauge is refreshed after the slot is returned, so completion, failure
/// and caller cancellation all report the lower count.
struct TrackedSlot<'a> {
    permit: Option<BulkheadPermit<'a>>,
    policy: &'a ResiliencePolicy,
}

impl<'a> TrackedSlot<'a> {
    fn new(policy: &'a ResiliencePolicy, permit: BulkheadPermit<'a>) -> Self {
        metrics::record_bulkhead_in_flight(&policy.name, policy.bulkhead.in_flight());
        Self {
            permit: Some(permit),
            policy,
        }
    }
}

impl Drop for TrackedSlot<'_> {
    fn drop(&mut self) {
        self.permit.take();
        metrics::record_bulkhead_in_flight(&self.policy.name, self.policy.bulkhead.in_flight());
    }
}
