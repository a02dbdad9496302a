//! CLI help and command-name contract for logging spans.

use crate::cli::parse::Commands;

/// Command name string used as the `command` field on log events
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Build { .. } => "build",
        Commands::Digest { .. } => "digest",
        Commands::Check { .. } => "check",
    }
}
