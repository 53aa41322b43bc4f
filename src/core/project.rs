//! Hybrid project abstraction.
//!
//! A [`HybridProject`] is a directory containing a `Pontoon.toml` manifest
//! and, once the platform tool has run, a generated
//! `platforms/platforms.json` state file recording which engine versions
//! are actually installed per platform.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::{bail, Result};

use crate::core::manifest::MANIFEST_FILE;

/// Generated state file path, relative to the project root.
const PLATFORMS_JSON: &str = "platforms/platforms.json";

/// Per-project modification locks, keyed by canonical root path.
///
/// Structural mutations (the update op) hold the project's lock for their
/// whole duration, serialising them against each other within the process.
static MODIFY_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

/// A hybrid mobile app project on disk.
#[derive(Debug, Clone)]
pub struct HybridProject {
    root: PathBuf,
}

impl HybridProject {
    /// Open a project rooted at the given directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            bail!("not a project directory: {}", root.display());
        }
        let root = root.canonicalize().unwrap_or(root);
        Ok(HybridProject { root })
    }

    /// The project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Human-readable project name (the root directory name).
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Path of the project manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Path of the generated platforms.json state file.
    pub fn platforms_json_path(&self) -> PathBuf {
        self.root.join(PLATFORMS_JSON)
    }

    /// Read the platforms.json state: a flat `{platform_id: version}` map.
    ///
    /// Absence of the file is normal and yields `None`. Unreadable or
    /// malformed content is reported as a warning and also yields `None`;
    /// the resolver falls through to the next source either way.
    pub fn read_platforms_state(&self) -> Option<BTreeMap<String, String>> {
        let path = self.platforms_json_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no platforms.json at {}", path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("could not read {}: {}", path.display(), e);
                return None;
            }
        };

        let root: serde_json::Map<String, serde_json::Value> =
            match serde_json::from_str(&contents) {
                Ok(root) => root,
                Err(e) => {
                    tracing::warn!("{} has errors: {}", path.display(), e);
                    return None;
                }
            };

        let mut state = BTreeMap::new();
        for (platform, version) in root {
            match version.as_str() {
                Some(v) => {
                    state.insert(platform, v.to_string());
                }
                None => {
                    tracing::warn!(
                        "ignoring non-string value for `{}` in {}",
                        platform,
                        path.display()
                    );
                }
            }
        }
        Some(state)
    }

    /// The exclusive modification lock for this project.
    pub fn modify_lock(&self) -> Arc<Mutex<()>> {
        let locks = MODIFY_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
        let mut locks = locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(self.root.clone()).or_default().clone()
    }

    /// Refresh the on-disk view after external commands ran.
    ///
    /// The resolver re-reads all sources on every call, so this only needs
    /// to surface what changed for observability.
    pub fn refresh(&self) {
        let state = self.read_platforms_state().unwrap_or_default();
        tracing::debug!(
            "refreshed {}: platforms state now covers [{}]",
            self.name(),
            state.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }
}
