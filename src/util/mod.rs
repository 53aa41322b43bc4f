//! Shared utilities

pub mod config;
pub mod fs;
pub mod process;
pub mod progress;

pub use config::Config;
pub use process::ProcessBuilder;
pub use progress::ProgressToken;
