//! CLI output: manifest encodings and error mapping to the CLI surface.

use crate::error::ApiError;
use crate::manifest::Manifest;
use std::path::Path;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Manifest(inner) if inner.is_internal() => {
            format!("internal error (please report): {}", inner)
        }
        other => other.to_string(),
    }
}

/// Encoding used for manifests on disk and on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "json" => Ok(ManifestFormat::Json),
            "toml" => Ok(ManifestFormat::Toml),
            other => Err(ApiError::Output(format!(
                "Unknown manifest format '{}' (expected json or toml)",
                other
            ))),
        }
    }

    /// Pick the encoding from a file extension; anything but `.toml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }

    pub fn render(self, manifest: &Manifest) -> Result<String, ApiError> {
        Ok(match self {
            ManifestFormat::Json => manifest.to_json()?,
            ManifestFormat::Toml => manifest.to_toml()?,
        })
    }

    pub fn decode(self, text: &str) -> Result<Manifest, ApiError> {
        Ok(match self {
            ManifestFormat::Json => Manifest::from_json(text)?,
            ManifestFormat::Toml => Manifest::from_toml(text)?,
        })
    }
}

/// Write rendered output to `path`, creating parent directories
pub fn write_output(path: &Path, contents: &str) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::Output(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
    }
    std::fs::write(path, contents)
        .map_err(|e| ApiError::Output(format!("Failed to write {}: {}", path.display(), e)))
}
