//! CLI command handlers, one file per mode.

mod archive;
mod metadata;

pub use archive::run_archive;
pub use metadata::run_metadata;
