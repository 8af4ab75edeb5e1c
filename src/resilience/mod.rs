//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Provider call:
//!     → bulkhead.rs (admit or reject, wait for an execution slot)
//!     → retries.rs (re-run failed attempts)
//!         → circuit_breaker.rs (fail fast when open, count failures)
//!             → timeouts.rs (bound the single attempt)
//!                 → outbound request
//! ```
//!
//! # Design Decisions
//! - Each layer owns a single concern; policy.rs composes them in a fixed order
//! - The breaker sits inside the retry loop so it sees every attempt, timeouts included
//! - Rejections (open circuit, full bulkhead) are never retried

pub mod backoff;
pub mod bulkhead;
pub mod circuit_breaker;
pub mod policy;
pub mod retries;
pub mod timeouts;

use std::time::Duration;
use thiserror::Error;

pub use bulkhead::{Bulkhead, BulkheadRejected};
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use policy::{PolicySnapshot, ResiliencePolicy};
pub use retries::RetryPolicy;
pub use timeouts::TimeoutPolicy;

/// Failure of a call executed through the resilience pipeline.
#[derive(Debug, Error)]
pub enum PolicyError<E> {
    /// The attempt did not finish within its deadline.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The circuit breaker rejected the call without attempting it.
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// The bulkhead had no running slot and no queue space.
    #[error("bulkhead capacity exceeded")]
    CapacityExceeded,

    /// The attempt task ended without producing a result (panic or cancellation).
    #[error("attempt aborted: {0}")]
    Aborted(String),

    /// The wrapped operation failed.
    #[error("{0}")]
    Inner(E),
}

impl<E> PolicyError<E> {
    /// Whether the retry layer may re-attempt after this failure.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PolicyError::CircuitOpen | PolicyError::CapacityExceeded)
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyError::Timeout(_) => "timeout",
            PolicyError::CircuitOpen => "circuit_open",
            PolicyError::CapacityExceeded => "capacity_exceeded",
            PolicyError::Aborted(_) => "aborted",
            PolicyError::Inner(_) => "provider_error",
        }
    }
}
