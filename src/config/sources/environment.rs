//! Environment source: CONTINUITY__<SECTION>__<KEY>, e.g. CONTINUITY__MANIFEST__DIGEST=blake3

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const PREFIX: &str = "CONTINUITY";
pub const SEPARATOR: &str = "__";

/// Add the environment source. `manifest.exclude` accepts a comma-separated list.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(PREFIX)
            .prefix_separator(SEPARATOR)
            .separator(SEPARATOR)
            .list_separator(",")
            .with_list_parse_key("manifest.exclude")
            .try_parsing(true),
    )
}
