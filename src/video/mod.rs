//! Movie trailer search.
//!
//! # Data Flow
//! ```text
//! SearchRequest
//!     → types.rs (validate, normalize search term)
//!     → client.rs (build provider query, run through resilience policy)
//!     → provider response → VideoListResult
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::YoutubeVideoClient;
pub use error::{ProviderError, VideoServiceError};
pub use types::{normalize_search_term, SearchRequest, Video, VideoListResult, TRAILER_MARKER};
