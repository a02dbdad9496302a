//! CLI route: single route table and run context. Dispatches to the manifest
//! library and presentation.

use crate::cli::help::command_name;
use crate::cli::output::{write_output, ManifestFormat};
use crate::cli::parse::{Commands, ManifestArgs};
use crate::cli::presentation::{format_check_summary, format_digest_summary};
use crate::config::{ConfigLoader, ContinuityConfig};
use crate::error::ApiError;
use crate::manifest::{DigestAlgorithm, Manifest, ManifestBuilder, ManifestConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: loaded configuration only.
pub struct RunContext {
    config: ContinuityConfig,
    config_path: Option<PathBuf>,
}

impl RunContext {
    /// Create run context from an optional config path. Uses ConfigLoader only.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_optional(config_path.as_ref())?;
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Create run context from an already loaded configuration.
    pub fn with_config(config: ContinuityConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(
            command = name,
            config_path = ?self.config_path,
            "Executing command"
        );

        let result = match command {
            Commands::Build {
                args,
                format,
                output,
            } => self.handle_build(args, format, output.as_deref()),
            Commands::Digest { args, algorithm } => self.handle_digest(args, algorithm),
            Commands::Check { file } => self.handle_check(file),
        };

        match &result {
            Ok(_) => info!(
                command = name,
                duration_ms = started.elapsed().as_millis(),
                "Command succeeded"
            ),
            Err(e) => warn!(command = name, error = %e, "Command failed"),
        }
        result
    }

    fn handle_build(
        &self,
        args: &ManifestArgs,
        format: &str,
        output: Option<&Path>,
    ) -> Result<String, ApiError> {
        let format = ManifestFormat::parse(format)?;
        let manifest = self.build_manifest(args)?;
        let rendered = format.render(&manifest)?;

        match output {
            Some(path) => {
                write_output(path, &rendered)?;
                Ok(format!(
                    "Wrote {} entries to {}",
                    manifest.len(),
                    path.display()
                ))
            }
            None => Ok(rendered),
        }
    }

    fn handle_digest(&self, args: &ManifestArgs, algorithm: &str) -> Result<String, ApiError> {
        let algorithm: DigestAlgorithm = algorithm.parse().map_err(ApiError::ConfigError)?;
        let manifest = self.build_manifest(args)?;
        let digest = manifest.digest(algorithm)?;
        Ok(format_digest_summary(&digest, &manifest))
    }

    fn handle_check(&self, file: &Path) -> Result<String, ApiError> {
        let text = std::fs::read_to_string(file)
            .map_err(|e| ApiError::Output(format!("Failed to read {}: {}", file.display(), e)))?;
        let manifest = ManifestFormat::from_path(file).decode(&text)?;
        Ok(format_check_summary(&manifest))
    }

    fn build_manifest(&self, args: &ManifestArgs) -> Result<Manifest, ApiError> {
        let config = self.manifest_config(args)?;
        Ok(ManifestBuilder::new(args.root.clone())
            .with_config(config)
            .build()?)
    }

    /// Command-line flags layered over the loaded `[manifest]` section
    fn manifest_config(&self, args: &ManifestArgs) -> Result<ManifestConfig, ApiError> {
        let mut config = self.config.manifest.clone();
        if let Some(ref digest) = args.digest {
            config.digest = digest.parse().map_err(ApiError::ConfigError)?;
        }
        if let Some(ref policy) = args.symlink_policy {
            config.symlink_policy = policy.parse().map_err(ApiError::ConfigError)?;
        }
        config.exclude.extend(args.exclude.iter().cloned());
        config.validate().map_err(ApiError::ConfigError)?;
        Ok(config)
    }
}
