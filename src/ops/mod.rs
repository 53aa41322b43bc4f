//! High-level operations.
//!
//! This module contains the write path (engine reconciliation) and the
//! external platform CLI it drives.

pub mod platform_cli;
pub mod update;

pub use platform_cli::{CliOutcome, PlatformCli, ToolCli};
pub use update::{
    plan, update_engines, update_engines_blocking, ReconcilePlan, UpdateError, UpdateHandle,
    UpdateStatus,
};
