//! Configuration sources, in ascending precedence.

pub mod environment;
pub mod global_file;
