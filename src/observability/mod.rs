//! Observability subsystem.
//!
//! ```text
//! video client / resilience pipeline / HTTP layer
//!     → logging.rs (tracing events, one span per inbound request)
//!     → metrics.rs (search outcomes, attempts, breaker and bulkhead state)
//!
//! stdout ← fmt subscriber          Prometheus ← exporter listener
//! ```
//!
//! Both are installed once by the service binary. The library only emits;
//! without an installed subscriber or recorder every call is a no-op.

pub mod logging;
pub mod metrics;
