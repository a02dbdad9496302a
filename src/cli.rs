//! CLI domain: parse, route, help, output, and presentation only.
//! No manifest logic; the route table calls into the library.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::{map_error, ManifestFormat};
pub use parse::{Cli, Commands, ManifestArgs};
pub use presentation::{format_check_summary, format_digest_summary};
pub use route::RunContext;
