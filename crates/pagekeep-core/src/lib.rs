pub mod config;
pub mod logging;

pub mod archiver;
pub mod css;
pub mod fetcher;
pub mod local_path;
pub mod metadata;
pub mod transport;
