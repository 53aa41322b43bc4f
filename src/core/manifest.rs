//! Pontoon.toml manifest parsing and editing.
//!
//! The manifest is the project's declarative configuration file. The part
//! this crate cares about is the engine list:
//!
//! ```toml
//! [app]
//! name = "myapp"
//! id = "com.example.myapp"
//!
//! [[engines]]
//! name = "android"
//! spec = "^14.0.0"
//!
//! [[engines]]
//! name = "ios"
//! spec = "7.1.0"
//! ```
//!
//! Reading and editing are distinct modes: [`Manifest::load`] is the cheap
//! read-only parse used by the resolver, while [`ManifestEdit`] holds a
//! format-preserving `toml_edit` document and implies intent to persist.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use toml_edit::{value, ArrayOfTables, DocumentMut, Item, Table};

use crate::core::engine::EngineRef;
use crate::util::fs;

/// Canonical manifest file name.
pub const MANIFEST_FILE: &str = "Pontoon.toml";

/// App metadata from the `[app]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub name: Option<String>,
    pub id: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManifestDoc {
    app: AppMetadata,
    engines: Vec<RawEngineRef>,
}

/// Raw engine entry; entries occasionally appear without a name or spec
/// attribute, and those are skipped rather than rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEngineRef {
    name: Option<String>,
    spec: Option<String>,
}

/// The parsed, read-only view of a project manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// App metadata.
    pub app: AppMetadata,

    /// Declared engine refs, in manifest order.
    pub engines: Vec<EngineRef>,
}

impl Manifest {
    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let doc: ManifestDoc = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let mut engines = Vec::with_capacity(doc.engines.len());
        for raw in doc.engines {
            match (raw.name, raw.spec) {
                (Some(name), Some(spec)) => engines.push(EngineRef::new(name, spec)),
                (name, _) => {
                    tracing::warn!(
                        "skipping incomplete engine entry in {}: name={:?}",
                        path.display(),
                        name
                    );
                }
            }
        }

        Ok(Manifest {
            app: doc.app,
            engines,
        })
    }
}

/// A manifest opened for edit.
///
/// Wraps a `toml_edit` document so that comments and formatting outside the
/// engine list survive a rewrite. Nothing touches the file until [`save`]
/// is called.
///
/// [`save`]: ManifestEdit::save
#[derive(Debug)]
pub struct ManifestEdit {
    path: PathBuf,
    doc: DocumentMut,
}

impl ManifestEdit {
    /// Open a manifest for editing. An absent file yields an empty document
    /// (the manifest is created on first save); a malformed file is an
    /// error, since editing it would destroy user content.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = if path.exists() {
            let contents = fs::read_to_string(path)?;
            contents
                .parse::<DocumentMut>()
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            DocumentMut::new()
        };

        Ok(ManifestEdit {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// The declared engine refs, in document order.
    pub fn engine_refs(&self) -> Vec<EngineRef> {
        let Some(tables) = self.doc.get("engines").and_then(Item::as_array_of_tables) else {
            return Vec::new();
        };
        tables
            .iter()
            .filter_map(|t| {
                let name = t.get("name")?.as_str()?;
                let spec = t.get("spec")?.as_str()?;
                Some(EngineRef::new(name, spec))
            })
            .collect()
    }

    /// Replace the engine list wholesale, preserving everything else in the
    /// document. An empty list removes the `[[engines]]` tables entirely.
    pub fn set_engine_refs(&mut self, refs: &[EngineRef]) {
        if refs.is_empty() {
            self.doc.remove("engines");
            return;
        }

        let mut tables = ArrayOfTables::new();
        for r in refs {
            let mut t = Table::new();
            t["name"] = value(&r.name);
            t["spec"] = value(&r.spec);
            tables.push(t);
        }
        self.doc["engines"] = Item::ArrayOfTables(tables);
    }

    /// Persist the document.
    pub fn save(&self) -> Result<()> {
        fs::write_string(&self.path, &self.doc.to_string())
    }

    /// The manifest path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
