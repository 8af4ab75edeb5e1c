//! Retry logic.
//!
//! # Responsibilities
//! - Re-run a failed attempt up to the configured retry count
//! - Stop immediately on fail-fast rejections (open circuit, full bulkhead)
//! - Surface the last failure unchanged once retries are exhausted
//! - Report the last real attempt's failure when a rejection cuts a call short
//!
//! # Design Decisions
//! - Immediate retries by default; an optional jittered backoff can be configured
//! - Retries are counted per logical call, each attempt gets a fresh timeout

use std::fmt::Display;
use std::future::Future;

use crate::resilience::backoff::calculate_backoff;
use crate::resilience::PolicyError;

/// Fixed-count retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    retry_count: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    /// Retry up to `retry_count` times without delay.
    pub fn immediate(retry_count: u32) -> Self {
        Self::with_backoff(retry_count, 0, 0)
    }

    /// Retry up to `retry_count` times, sleeping an exponential jittered delay between attempts.
    pub fn with_backoff(retry_count: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            retry_count,
            base_delay_ms,
            max_delay_ms,
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Run `attempt` until it succeeds, fails fast, or retries run out.
    ///
    /// The closure receives the zero-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> Result<T, PolicyError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, PolicyError<E>>>,
        E: Display,
    {
        let mut retries = 0;
        let mut last_failure = None;
        loop {
            match attempt(retries).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retries < self.retry_count => {
                    retries += 1;
                    let delay = calculate_backoff(retries, self.base_delay_ms, self.max_delay_ms);
                    tracing::warn!(
                        retry = retries,
                        max_retries = self.retry_count,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Attempt failed, retrying"
                    );
                    last_failure = Some(err);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                // A rejection after a real attempt reports what that attempt hit.
                Err(err) if !err.is_retryable() => {
                    if let Some(previous) = last_failure {
                        tracing::debug!(
                            rejection = %err,
                            error = %previous,
                            "Rejected mid-call, surfacing last attempt failure"
                        );
                        return Err(previous);
                    }
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
