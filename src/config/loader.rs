//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `youtube.api_key`.
pub const API_KEY_ENV: &str = "MOVIE_SEARCH_YOUTUBE_API_KEY";

/// Environment variable overriding `listener.bind_address`.
pub const BIND_ADDRESS_ENV: &str = "MOVIE_SEARCH_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;
    finish(config)
}

/// Load from `path` if given, otherwise start from defaults; then apply
/// environment overrides and validate.
pub fn load_config_or_default(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ServiceConfig::default(),
    };
    finish(config)
}

fn finish(mut config: ServiceConfig) -> Result<ServiceConfig, ConfigError> {
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
        config.youtube.api_key = key;
    }
    if let Some(addr) = lookup(BIND_ADDRESS_ENV).filter(|v| !v.trim().is_empty()) {
        config.listener.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (API_KEY_ENV, "from-env"),
            (BIND_ADDRESS_ENV, "127.0.0.1:9000"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.youtube.api_key = "from-file".to_string();
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.youtube.api_key, "from-env");
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = ServiceConfig::default();
        config.youtube.api_key = "from-file".to_string();
        apply_env_overrides(&mut config, |_| Some("   ".to_string()));
        assert_eq!(config.youtube.api_key, "from-file");
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("movie-search-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
            [youtube]
            api_key = "file-key"

            [policy]
            retry_count = 1
            timeout_ms = 2500
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.policy.retry_count, 1);
        assert_eq!(config.policy.timeout_ms, 2500);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_invalid_file_reports_validation_errors() {
        let path = std::env::temp_dir().join(format!("movie-search-bad-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
            [youtube]
            api_key = "file-key"

            [policy]
            max_queued = 0
            "#,
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("policy.max_queued"));

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
