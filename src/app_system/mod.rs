//! Startup, wiring and shutdown of the download service.

pub mod config;
pub mod download_system;
pub mod error;
pub mod logging;

pub use config::{Cli, DownloadSettings};
pub use download_system::DownloadSystem;
pub use error::SystemError;
pub use logging::setup_tracing;
