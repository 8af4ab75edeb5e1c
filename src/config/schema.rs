//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the movie search service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound request timeouts.
    pub timeouts: TimeoutConfig,

    /// Video provider (YouTube Data API) settings.
    pub youtube: YoutubeVideoOptions,

    /// Resilience policy applied to provider calls.
    pub policy: PolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// YouTube search provider options.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct YoutubeVideoOptions {
    /// API key sent with every search. Usually supplied through the environment.
    pub api_key: String,

    /// Base URL of the Data API (the `/search` path is appended).
    pub base_url: String,

    /// Application name reported in the User-Agent header.
    pub application_name: String,

    /// Resource part requested from `search.list`.
    pub search_part: String,

    /// Result ordering (relevance, date, rating, title, viewCount).
    pub order: String,

    /// Result type filter.
    pub search_type: String,
}

impl Default for YoutubeVideoOptions {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            application_name: "movie-search".to_string(),
            search_part: "snippet".to_string(),
            order: "relevance".to_string(),
            search_type: "video".to_string(),
        }
    }
}

impl std::fmt::Debug for YoutubeVideoOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeVideoOptions")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("application_name", &self.application_name)
            .field("search_part", &self.search_part)
            .field("order", &self.order)
            .field("search_type", &self.search_type)
            .finish()
    }
}

/// How an attempt is abandoned once its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutStrategy {
    /// Run the attempt on its own task and abort that task at the deadline.
    #[default]
    Pessimistic,
    /// Cancel the attempt at the deadline.
    Optimistic,
}

/// Resilience policy for provider calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Retries after the first failed attempt.
    pub retry_count: u32,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// How long the circuit stays open, in milliseconds.
    pub break_duration_ms: u64,

    /// Calls allowed to run concurrently.
    pub max_parallel: usize,

    /// Calls allowed to wait for a running slot.
    pub max_queued: usize,

    /// Timeout strategy.
    pub timeout_strategy: TimeoutStrategy,

    /// Base delay between retries in milliseconds (0 = retry immediately).
    pub retry_base_delay_ms: u64,

    /// Upper bound of the retry delay in milliseconds.
    pub retry_max_delay_ms: u64,
}

impl PolicyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn break_duration(&self) -> Duration {
        Duration::from_millis(self.break_duration_ms)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            retry_count: 2,
            timeout_ms: 10_000,
            break_duration_ms: 30_000,
            max_parallel: 3,
            max_queued: 6,
            timeout_strategy: TimeoutStrategy::Pessimistic,
            retry_base_delay_ms: 0,
            retry_max_delay_ms: 2_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
