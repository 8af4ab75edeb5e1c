//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define service metrics (searches, attempts, breaker and bulkhead state)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `video_search_requests_total` (counter): searches by outcome
//! - `video_search_duration_seconds` (histogram): end-to-end search latency
//! - `video_search_attempts_total` (counter): provider attempts by result
//! - `circuit_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `circuit_breaker_transitions_total` (counter): transitions by target state
//! - `bulkhead_rejections_total` (counter): calls shed by the bulkhead
//! - `bulkhead_in_flight` (gauge): calls holding an execution slot
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users and
//!   tests pay nothing
//! - Labels carry the policy name so several clients can share one exporter

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished search.
pub fn record_search(outcome: &'static str, start: Instant) {
    counter!("video_search_requests_total", "outcome" => outcome).increment(1);
    histogram!("video_search_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one provider attempt.
pub fn record_attempt(policy: &str, result: &'static str) {
    counter!(
        "video_search_attempts_total",
        "policy" => policy.to_string(),
        "result" => result
    )
    .increment(1);
}

/// Record the current breaker state.
pub fn record_circuit_state(policy: &str, state: CircuitState) {
    gauge!("circuit_breaker_state", "policy" => policy.to_string()).set(state.as_gauge());
}

/// Record a breaker transition.
pub fn record_circuit_transition(policy: &str, to: CircuitState) {
    let target = match to {
        CircuitState::Closed => "closed",
        CircuitState::Open => "open",
        CircuitState::HalfOpen => "half_open",
    };
    counter!(
        "circuit_breaker_transitions_total",
        "policy" => policy.to_string(),
        "to" => target
    )
    .increment(1);
    record_circuit_state(policy, to);
}

/// Record a call shed by the bulkhead.
pub fn record_bulkhead_rejection(policy: &str) {
    counter!("bulkhead_rejections_total", "policy" => policy.to_string()).increment(1);
}

/// Record bulkhead occupancy.
pub fn record_bulkhead_in_flight(policy: &str, in_flight: usize) {
    gauge!("bulkhead_in_flight", "policy" => policy.to_string()).set(in_flight as f64);
}
