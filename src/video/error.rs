//! Video search errors.

use std::time::Duration;
use thiserror::Error;

use crate::resilience::PolicyError;

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("invalid provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The attempt ended without a result.
    #[error("attempt aborted: {0}")]
    Aborted(String),

    /// The client could not be built from its options.
    #[error("invalid provider configuration: {0}")]
    Configuration(String),
}

/// Errors surfaced by [`crate::video::YoutubeVideoClient::get_trailers`].
#[derive(Debug, Error)]
pub enum VideoServiceError {
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider circuit is open")]
    CircuitOpen,

    #[error("too many concurrent provider calls")]
    CapacityExceeded,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl VideoServiceError {
    /// Short, stable label for logs, metrics and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            VideoServiceError::InvalidRequest(_) => "invalid_request",
            VideoServiceError::Timeout(_) => "timeout",
            VideoServiceError::CircuitOpen => "circuit_open",
            VideoServiceError::CapacityExceeded => "capacity_exceeded",
            VideoServiceError::Provider(_) => "provider_error",
        }
    }
}

impl From<PolicyError<ProviderError>> for VideoServiceError {
    fn from(err: PolicyError<ProviderError>) -> Self {
        match err {
            PolicyError::Timeout(after) => VideoServiceError::Timeout(after),
            PolicyError::CircuitOpen => VideoServiceError::CircuitOpen,
            PolicyError::CapacityExceeded => VideoServiceError::CapacityExceeded,
            PolicyError::Aborted(reason) => ProviderError::Aborted(reason).into(),
            PolicyError::Inner(provider) => provider.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_errors_keep_their_kind() {
        let cases = [
            (PolicyError::Timeout(Duration::from_secs(2)), "timeout"),
            (PolicyError::CircuitOpen, "circuit_open"),
            (PolicyError::CapacityExceeded, "capacity_exceeded"),
            (PolicyError::Aborted("panic".to_string()), "provider_error"),
            (
                PolicyError::Inner(ProviderError::Api {
                    status: 403,
                    message: "quotaExceeded".to_string(),
                }),
                "provider_error",
            ),
        ];
        for (policy_error, kind) in cases {
            assert_eq!(VideoServiceError::from(policy_error).kind(), kind);
        }
    }

    #[test]
    fn test_error_display() {
        let err: VideoServiceError = ProviderError::Api {
            status: 500,
            message: "backendError".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "provider returned 500: backendError");
    }
}
