//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bulkhead limits > 0)
//! - Validate addresses and the provider base URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("policy.retry_max_delay_ms ({max}) is lower than policy.retry_base_delay_ms ({base})")]
    BackoffRange { base: u64, max: u64 },
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::MustBePositive {
            field: "timeouts.request_secs",
        });
    }

    let youtube = &config.youtube;
    if youtube.api_key.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "youtube.api_key",
        });
    }
    match Url::parse(&youtube.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidUrl {
            field: "youtube.base_url",
            value: youtube.base_url.clone(),
        }),
    }
    for (field, value) in [
        ("youtube.search_part", &youtube.search_part),
        ("youtube.order", &youtube.order),
        ("youtube.search_type", &youtube.search_type),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }

    let policy = &config.policy;
    for (field, value) in [
        ("policy.timeout_ms", policy.timeout_ms),
        ("policy.break_duration_ms", policy.break_duration_ms),
        ("policy.max_parallel", policy.max_parallel as u64),
        ("policy.max_queued", policy.max_queued as u64),
    ] {
        if value == 0 {
            errors.push(ValidationError::MustBePositive { field });
        }
    }
    if policy.retry_base_delay_ms > 0 && policy.retry_max_delay_ms < policy.retry_base_delay_ms {
        errors.push(ValidationError::BackoffRange {
            base: policy.retry_base_delay_ms,
            max: policy.retry_max_delay_ms,
        });
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.youtube.api_key = "test-key".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_api_key() {
        let errors = validate_config(&ServiceConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::Empty {
                field: "youtube.api_key"
            }]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.policy.timeout_ms = 0;
        config.policy.max_parallel = 0;
        config.youtube.base_url = "ftp://example.com".to_string();
        config.listener.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MustBePositive {
            field: "policy.timeout_ms"
        }));
        assert!(errors.contains(&ValidationError::MustBePositive {
            field: "policy.max_parallel"
        }));
    }

    #[test]
    fn test_backoff_range() {
        let mut config = valid_config();
        config.policy.retry_base_delay_ms = 500;
        config.policy.retry_max_delay_ms = 100;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::BackoffRange { base: 500, max: 100 }]);
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = valid_config();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nope".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
