//! Configuration System
//!
//! Layered configuration for manifest builds and logging. Sources, lowest
//! precedence first: built-in defaults, the global config file (or an
//! explicit file), then `CONTINUITY__*` environment variables.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::manifest::ManifestConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityConfig {
    /// Manifest build options
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Manifest(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Manifest(msg) => write!(f, "Manifest: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ContinuityConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.manifest.validate() {
            errors.push(ValidationError::Manifest(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`ContinuityConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the global config file, then the environment
    pub fn load() -> Result<ContinuityConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::environment::add_to_builder(builder);
        Self::finish(builder)
    }

    /// Defaults, then `path` (which must exist), then the environment
    pub fn load_from_file(path: &Path) -> Result<ContinuityConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::merge_policy::builder_with_defaults()?.add_source(
            config::File::from(path.to_path_buf())
                .format(config::FileFormat::Toml)
                .required(true),
        );
        let builder = sources::environment::add_to_builder(builder);
        Self::finish(builder)
    }

    /// Load from an explicit file when given, otherwise from the default sources
    pub fn load_optional(path: Option<&PathBuf>) -> Result<ContinuityConfig, ApiError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<ContinuityConfig, ApiError> {
        let config: ContinuityConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
