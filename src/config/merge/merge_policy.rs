//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Sources added afterwards override these keys; tables merge key by key and
/// arrays are replaced wholesale.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("manifest.digest", "sha256")?
        .set_default("manifest.symlink_policy", "keep")?
        .set_default("manifest.group_file", "/etc/group")?
        .set_default("manifest.strict_hard_links", false)?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
