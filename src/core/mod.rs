//! Core data model: engines, manifest, project.

pub mod engine;
pub mod manifest;
pub mod project;

pub use engine::{is_supported_platform, EngineRef, InstalledEngine, SUPPORTED_PLATFORMS};
pub use manifest::{AppMetadata, Manifest, ManifestEdit, MANIFEST_FILE};
pub use project::HybridProject;
