//! Filesystem-backed catalog source.
//!
//! Managed engines live under `<engines dir>/<platform>/<version>/`, one
//! directory per installed version. User-supplied local engines are listed
//! in `<engines dir>/unmanaged.toml`:
//!
//! ```toml
//! [[engines]]
//! id = "android"
//! location = "/opt/sdk/cordova-android"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use walkdir::WalkDir;

use super::CatalogSource;
use crate::core::engine::{is_supported_platform, InstalledEngine};

const UNMANAGED_FILE: &str = "unmanaged.toml";

/// Catalog source scanning a local engines directory.
#[derive(Debug, Clone)]
pub struct DirCatalogSource {
    root: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UnmanagedDoc {
    engines: Vec<UnmanagedEntry>,
}

#[derive(Debug, Deserialize)]
struct UnmanagedEntry {
    id: String,
    location: PathBuf,
}

impl DirCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirCatalogSource { root: root.into() }
    }

    fn scan_managed(&self) -> Vec<InstalledEngine> {
        let mut engines = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
        {
            let version = entry.file_name().to_string_lossy().into_owned();
            let Some(id) = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            if !is_supported_platform(&id) {
                tracing::debug!("skipping unknown platform directory `{}`", id);
                continue;
            }
            engines.push(InstalledEngine::managed(id, version));
        }
        engines
    }

    fn read_unmanaged(&self) -> Result<Vec<InstalledEngine>> {
        let path = self.root.join(UNMANAGED_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let doc: UnmanagedDoc = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(doc
            .engines
            .into_iter()
            .map(|e| InstalledEngine::unmanaged(e.id, e.location))
            .collect())
    }
}

impl CatalogSource for DirCatalogSource {
    fn engines(&self) -> Result<Vec<InstalledEngine>> {
        // An absent engines dir just means nothing is installed yet.
        if !self.root.is_dir() {
            tracing::debug!("no engines directory at {}", self.root.display());
            return Ok(Vec::new());
        }
        let mut engines = self.scan_managed();
        engines.extend(self.read_unmanaged()?);
        Ok(engines)
    }
}
