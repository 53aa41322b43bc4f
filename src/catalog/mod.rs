//! Installed-engine catalog.
//!
//! The catalog is a read-only snapshot of the engines available on this
//! machine. The [`CatalogSource`] trait is the seam to whatever enumerates
//! them; the resolver re-reads the source on every resolution so the view
//! is always current.

mod dir_source;

use anyhow::Result;

pub use dir_source::DirCatalogSource;

use crate::core::engine::InstalledEngine;

/// Something that can enumerate the engines installed on this machine.
pub trait CatalogSource {
    /// List available engines. May legitimately return an empty list.
    fn engines(&self) -> Result<Vec<InstalledEngine>>;
}

/// A read-only snapshot of available engines with id/version lookups.
#[derive(Debug, Clone, Default)]
pub struct EngineCatalog {
    engines: Vec<InstalledEngine>,
}

impl EngineCatalog {
    pub fn new(engines: Vec<InstalledEngine>) -> Self {
        EngineCatalog { engines }
    }

    /// Snapshot a source. Source failure means "no candidates": it is
    /// reported as a warning and yields an empty catalog.
    pub fn from_source(source: &dyn CatalogSource) -> Self {
        match source.engines() {
            Ok(engines) => EngineCatalog { engines },
            Err(e) => {
                tracing::warn!("engine catalog unavailable: {:#}", e);
                EngineCatalog::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstalledEngine> {
        self.engines.iter()
    }

    /// Find a managed engine by exact id and version.
    pub fn find(&self, id: &str, version: &str) -> Option<&InstalledEngine> {
        self.engines
            .iter()
            .find(|e| e.managed && e.id == id && e.version == version)
    }

    /// All engines for a platform id, in catalog order.
    pub fn engines_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a InstalledEngine> {
        self.engines.iter().filter(move |e| e.id == id)
    }
}
