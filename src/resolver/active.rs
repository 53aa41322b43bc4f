//! Active engine set resolution.
//!
//! The active set is resolved from three layered sources, first non-empty
//! result winning:
//!
//! 1. the generated `platforms/platforms.json` state file, which records
//!    what the platform tool actually installed and takes total precedence
//!    over the manifest, even when it covers only a subset of platforms;
//! 2. the manifest's declared engine refs, matched against the catalog in
//!    manifest order;
//! 3. the computed default set.
//!
//! Every failure on this path is absorbed: the worst case is an empty set,
//! never an error.

use crate::catalog::EngineCatalog;
use crate::core::engine::{InstalledEngine, SUPPORTED_PLATFORMS};
use crate::core::manifest::Manifest;
use crate::core::project::HybridProject;
use crate::resolver::defaults;
use crate::resolver::version::engine_matches;
use crate::util::Config;

/// Which source produced the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// The platforms.json state file.
    PlatformsState,
    /// Declared engine refs in the manifest.
    ManifestEngines,
    /// The computed default set.
    Defaults,
}

/// Resolve the active engines for a project.
pub fn resolve(
    project: &HybridProject,
    catalog: &EngineCatalog,
    config: &Config,
) -> Vec<InstalledEngine> {
    resolve_with_source(project, catalog, config).0
}

/// Resolve the active engines, also reporting which source produced them.
pub fn resolve_with_source(
    project: &HybridProject,
    catalog: &EngineCatalog,
    config: &Config,
) -> (Vec<InstalledEngine>, ResolutionSource) {
    let from_state = from_platforms_state(project, catalog);
    if !from_state.is_empty() {
        return (from_state, ResolutionSource::PlatformsState);
    }

    match Manifest::load(&project.manifest_path()) {
        Ok(manifest) if !manifest.engines.is_empty() => {
            let active = match_declared(&manifest, catalog);
            (active, ResolutionSource::ManifestEngines)
        }
        Ok(_) => {
            tracing::info!(
                "no engine information in {}; falling back to default engines",
                project.manifest_path().display()
            );
            (
                defaults::compute(catalog, config.default_engines.as_deref()),
                ResolutionSource::Defaults,
            )
        }
        Err(e) => {
            tracing::warn!("engine information can not be read: {:#}", e);
            (
                defaults::compute(catalog, config.default_engines.as_deref()),
                ResolutionSource::Defaults,
            )
        }
    }
}

/// Resolve active engines from the platforms.json state file only.
///
/// For each supported platform, in the fixed platform order, look up a
/// managed catalog engine whose version exactly equals the recorded one.
/// Range markers are not handled here; the state file records installed
/// versions verbatim.
pub fn from_platforms_state(
    project: &HybridProject,
    catalog: &EngineCatalog,
) -> Vec<InstalledEngine> {
    let Some(state) = project.read_platforms_state() else {
        return Vec::new();
    };

    let mut active = Vec::new();
    for platform in SUPPORTED_PLATFORMS {
        if let Some(version) = state.get(*platform) {
            match catalog.find(platform, version) {
                Some(engine) => active.push(engine.clone()),
                None => {
                    tracing::debug!(
                        "platforms.json declares {}@{} but no such engine is installed",
                        platform,
                        version
                    );
                }
            }
        }
    }
    active
}

/// Match declared refs against the catalog, in manifest order.
///
/// Refs that match nothing are dropped by policy; the drop is counted and
/// reported rather than silent.
fn match_declared(manifest: &Manifest, catalog: &EngineCatalog) -> Vec<InstalledEngine> {
    let mut active = Vec::new();
    let mut dropped = Vec::new();
    for r in &manifest.engines {
        match catalog.iter().find(|e| engine_matches(r, e)) {
            Some(engine) => active.push(engine.clone()),
            None => dropped.push(r.to_string()),
        }
    }
    if !dropped.is_empty() {
        tracing::warn!(
            "{} declared engine(s) not installed, dropped from active set: {}",
            dropped.len(),
            dropped.join(", ")
        );
    }
    active
}
