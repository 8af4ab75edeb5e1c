//! Movie trailer search with a resilient YouTube client.
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP caller                                             YouTube Data API
//!       │                                                          ▲
//!       ▼                                                          │
//!  ┌─────────┐    ┌──────────────┐    ┌──────────────────────────────────┐
//!  │  http   │───▶│    video     │───▶│           resilience             │
//!  │ server  │    │   client     │    │ bulkhead → retry → breaker →     │
//!  └─────────┘    └──────────────┘    │ timeout → outbound request       │
//!                                     └──────────────────────────────────┘
//!
//!  Cross-cutting: config, observability (logging, metrics), lifecycle
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod video;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use video::{SearchRequest, Video, VideoListResult, VideoServiceError, YoutubeVideoClient};
