//! CLI parse: clap types for Continuity. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Continuity CLI - Deterministic filesystem manifests
#[derive(Parser)]
#[command(name = "continuity")]
#[command(about = "Build and check deterministic manifests of a directory tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a manifest of a directory tree
    Build {
        #[command(flatten)]
        args: ManifestArgs,

        /// Output format (json or toml)
        #[arg(long, default_value = "json")]
        format: String,

        /// Write the manifest to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Build a manifest and print the digest of the manifest itself
    Digest {
        #[command(flatten)]
        args: ManifestArgs,

        /// Algorithm for the manifest digest (sha256 or blake3)
        #[arg(long, default_value = "sha256")]
        algorithm: String,
    },
    /// Parse a stored manifest and validate its ordering and records
    Check {
        /// Manifest file (.json or .toml)
        file: PathBuf,
    },
}

/// Options shared by commands that build a manifest
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Root directory to describe
    pub root: PathBuf,

    /// Content digest algorithm (overrides config)
    #[arg(long)]
    pub digest: Option<String>,

    /// Path component name to exclude (repeatable, adds to config)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Handling of relative symlinks that leave the root: keep, warn, reject
    #[arg(long)]
    pub symlink_policy: Option<String>,
}
