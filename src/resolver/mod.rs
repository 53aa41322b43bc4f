//! Engine resolution: the read path.

pub mod active;
pub mod defaults;
pub mod version;

pub use active::{resolve, resolve_with_source, ResolutionSource};
pub use defaults::EnginePreference;
