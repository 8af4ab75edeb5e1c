//! Circuit breaker for the video provider.
//!
//! # States
//! - Closed: normal operation, calls pass through, consecutive failures counted
//! - Open: provider assumed down, calls fail fast
//! - Half-Open: one trial call decides whether the provider recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= threshold
//! Open → Half-Open: after the break duration elapses
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails
//! ```
//!
//! # Design Decisions
//! - One breaker per client instance, shared by all concurrent callers
//! - Fail fast in Open state (the attempt is never started)
//! - Single trial in Half-Open; a trial dropped without an outcome frees the slot

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::observability::metrics;

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    /// Gauge encoding used for metrics (0=closed, 1=open, 2=half-open).
    pub fn as_gauge(self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::Open => 1.0,
            CircuitState::HalfOpen => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { consecutive_failures: u32 },
    Open { until: Instant },
    HalfOpen { trial_in_flight: bool },
}

/// Three-state circuit breaker guarded by a mutex.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    break_duration: Duration,
    phase: Mutex<Phase>,
}

impl CircuitBreaker {
    /// Create a closed breaker that opens after `failure_threshold` consecutive failures.
    pub fn new(name: impl Into<String>, failure_threshold: u32, break_duration: Duration) -> Self {
        Self {
            name: name.into(),
            failure_threshold: failure_threshold.max(1),
            break_duration,
            phase: Mutex::new(Phase::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state. An open breaker whose break has elapsed reports Half-Open.
    pub fn state(&self) -> CircuitState {
        match *self.lock() {
            Phase::Closed { .. } => CircuitState::Closed,
            Phase::Open { until } if Instant::now() >= until => CircuitState::HalfOpen,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Number of consecutive failures counted while closed.
    pub fn consecutive_failures(&self) -> u32 {
        match *self.lock() {
            Phase::Closed {
                consecutive_failures,
            } => consecutive_failures,
            _ => self.failure_threshold,
        }
    }

    /// Configured failure threshold.
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Configured break duration.
    pub fn break_duration(&self) -> Duration {
        self.break_duration
    }

    /// Ask permission to run an attempt.
    ///
    /// Returns `None` when the breaker rejects the call. The returned permit must be
    /// settled with [`CircuitPermit::succeed`] or [`CircuitPermit::fail`].
    pub fn try_acquire(&self) -> Option<CircuitPermit<'_>> {
        let mut phase = self.lock();
        let current = *phase;
        let trial = match current {
            Phase::Closed { .. } => false,
            Phase::Open { until } if Instant::now() >= until => {
                *phase = Phase::HalfOpen {
                    trial_in_flight: true,
                };
                drop(phase);
                self.transitioned(CircuitState::HalfOpen);
                true
            }
            Phase::Open { .. } => return None,
            Phase::HalfOpen {
                trial_in_flight: true,
            } => return None,
            Phase::HalfOpen {
                trial_in_flight: false,
            } => {
                *phase = Phase::HalfOpen {
                    trial_in_flight: true,
                };
                true
            }
        };

        Some(CircuitPermit {
            breaker: self,
            trial,
            settled: false,
        })
    }

    fn on_success(&self, trial: bool) {
        let mut phase = self.lock();
        let current = *phase;
        match current {
            Phase::Closed { .. } => {
                *phase = Phase::Closed {
                    consecutive_failures: 0,
                };
            }
            Phase::HalfOpen { .. } if trial => {
                *phase = Phase::Closed {
                    consecutive_failures: 0,
                };
                drop(phase);
                self.transitioned(CircuitState::Closed);
            }
            // Late results of calls admitted before the breaker opened do not close it.
            _ => {}
        }
    }

    fn on_failure(&self, trial: bool) {
        let mut phase = self.lock();
        let current = *phase;
        match current {
            Phase::Closed {
                consecutive_failures,
            } => {
                let failures = consecutive_failures + 1;
                if failures >= self.failure_threshold {
                    *phase = Phase::Open {
                        until: Instant::now() + self.break_duration,
                    };
                    drop(phase);
                    tracing::warn!(
                        breaker = %self.name,
                        failures,
                        break_ms = self.break_duration.as_millis() as u64,
                        "Circuit breaker opened"
                    );
                    self.transitioned(CircuitState::Open);
                } else {
                    *phase = Phase::Closed {
                        consecutive_failures: failures,
                    };
                }
            }
            Phase::HalfOpen { .. } if trial => {
                *phase = Phase::Open {
                    until: Instant::now() + self.break_duration,
                };
                drop(phase);
                tracing::warn!(breaker = %self.name, "Trial call failed, circuit breaker re-opened");
                self.transitioned(CircuitState::Open);
            }
            _ => {}
        }
    }

    fn on_abandoned(&self) {
        let mut phase = self.lock();
        if let Phase::HalfOpen {
            trial_in_flight: true,
        } = *phase
        {
            *phase = Phase::HalfOpen {
                trial_in_flight: false,
            };
        }
    }

    fn transitioned(&self, to: CircuitState) {
        tracing::info!(breaker = %self.name, state = ?to, "Circuit breaker transition");
        metrics::record_circuit_transition(&self.name, to);
    }
}

/// Permission to run one attempt through the breaker.
#[derive(Debug)]
pub struct CircuitPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl CircuitPermit<'_> {
    /// Whether this permit is the Half-Open trial call.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// Report a successful attempt.
    pub fn succeed(mut self) {
        self.settled = true;
        self.breaker.on_success(self.trial);
    }

    /// Report a failed attempt.
    pub fn fail(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.trial);
    }
}

impl Drop for CircuitPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.on_abandoned();
        }
    }
}
