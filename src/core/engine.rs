//! Engine data model.
//!
//! An engine is a platform build backend (android, ios, ...) identified by
//! a platform id and either a catalog version or a local filesystem path.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The closed set of platform ids pontoon knows about.
///
/// The order here is significant: it bounds the iteration order when the
/// platforms.json state file is read, and therefore the output order of the
/// active set on that path.
pub const SUPPORTED_PLATFORMS: &[&str] = &["android", "ios", "windows", "browser", "electron"];

/// Check whether an id belongs to the supported platform set.
pub fn is_supported_platform(id: &str) -> bool {
    SUPPORTED_PLATFORMS.contains(&id)
}

/// An engine installed on this machine, as reported by a catalog source.
///
/// Managed engines come from a versioned catalog and carry a real version
/// string. Unmanaged engines are user-supplied local checkouts; they are
/// identified by `location`, and `version` holds the literal path string.
///
/// Instances are produced by catalog sources and never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledEngine {
    /// Platform id, e.g. "android".
    pub id: String,

    /// Version string for managed engines; the path string for unmanaged.
    pub version: String,

    /// Whether this engine came from the versioned catalog.
    pub managed: bool,

    /// Local checkout path. `Some` iff `managed` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
}

impl InstalledEngine {
    /// Create a managed (catalog-sourced) engine.
    pub fn managed(id: impl Into<String>, version: impl Into<String>) -> Self {
        InstalledEngine {
            id: id.into(),
            version: version.into(),
            managed: true,
            location: None,
        }
    }

    /// Create an unmanaged engine backed by a local path.
    pub fn unmanaged(id: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        let location = location.into();
        InstalledEngine {
            id: id.into(),
            version: location.display().to_string(),
            managed: false,
            location: Some(location),
        }
    }

    /// The spec string a manifest ref for this engine would carry:
    /// the location for unmanaged engines, the version otherwise.
    pub fn spec_string(&self) -> String {
        match &self.location {
            Some(loc) if !self.managed => loc.display().to_string(),
            _ => self.version.clone(),
        }
    }

    /// The location path, for unmanaged engines.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

impl fmt::Display for InstalledEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

/// One declared engine entry from the project manifest.
///
/// Refs are ordered; manifest order is preserved on write. They are created
/// and removed only by the reconciliation op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRef {
    /// Platform id.
    pub name: String,

    /// Version spec (possibly `~`/`^`-prefixed) or a local path.
    pub spec: String,
}

impl EngineRef {
    pub fn new(name: impl Into<String>, spec: impl Into<String>) -> Self {
        EngineRef {
            name: name.into(),
            spec: spec.into(),
        }
    }

    /// The ref that would declare the given installed engine.
    pub fn for_engine(engine: &InstalledEngine) -> Self {
        EngineRef {
            name: engine.id.clone(),
            spec: engine.spec_string(),
        }
    }
}

impl fmt::Display for EngineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.spec)
    }
}
