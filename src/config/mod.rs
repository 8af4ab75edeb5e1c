//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → policy settings handed to the video client once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Secrets (the provider API key) can come from the environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_or_default, ConfigError};
pub use schema::{
    ListenerConfig, ObservabilityConfig, PolicyConfig, ServiceConfig, TimeoutConfig,
    TimeoutStrategy, YoutubeVideoOptions,
};
pub use validation::{validate_config, ValidationError};
