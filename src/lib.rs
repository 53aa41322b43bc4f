//! Pontoon - engine manager for hybrid mobile app projects
//!
//! This crate provides the core library functionality for Pontoon:
//! resolving a project's active platform engines from its layered
//! configuration sources, computing default engines, and reconciling the
//! declared engine set against what is installed on the machine.

pub mod catalog;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

pub use crate::core::{
    engine::{EngineRef, InstalledEngine, SUPPORTED_PLATFORMS},
    manifest::Manifest,
    project::HybridProject,
};

pub use crate::catalog::{CatalogSource, DirCatalogSource, EngineCatalog};
pub use crate::resolver::{resolve, resolve_with_source, ResolutionSource};
pub use crate::util::Config;
