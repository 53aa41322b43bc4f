//! Default engine selection.
//!
//! When a project declares no engines, the default set is one engine per
//! platform id: either what the user asked for in the
//! `default_engines = "id:version,..."` preference, or the highest installed
//! version of each platform.

use std::collections::BTreeMap;

use crate::catalog::EngineCatalog;
use crate::core::engine::InstalledEngine;
use crate::resolver::version::parse_version_lenient;

/// One parsed `id:version` preference pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePreference {
    pub id: String,
    pub version: String,
}

/// Parse the preference wire format `id:version[,id:version...]`.
///
/// Malformed pairs are rejected individually, not the whole string.
pub fn parse_preference(raw: &str) -> Vec<EnginePreference> {
    raw.split(',')
        .filter(|p| !p.trim().is_empty())
        .filter_map(|pair| {
            let pair = pair.trim();
            match pair.split_once(':') {
                Some((id, version)) if !id.is_empty() && !version.is_empty() => {
                    Some(EnginePreference {
                        id: id.to_string(),
                        version: version.to_string(),
                    })
                }
                _ => {
                    tracing::warn!("ignoring malformed default-engine entry `{}`", pair);
                    None
                }
            }
        })
        .collect()
}

/// Compute the default engine set: one engine per platform id.
///
/// With an explicit preference, every catalog engine exactly matching a
/// `(id, version)` pair is included, duplicates and all. Without one, the
/// highest version per id wins; versions that do not parse (git URLs, local
/// paths) never displace an already-selected engine.
pub fn compute(catalog: &EngineCatalog, preference: Option<&str>) -> Vec<InstalledEngine> {
    if catalog.is_empty() {
        return Vec::new();
    }

    if let Some(raw) = preference.filter(|p| !p.is_empty()) {
        let prefs = parse_preference(raw);
        let mut defaults = Vec::new();
        for pref in &prefs {
            for engine in catalog.iter() {
                if engine.id == pref.id && engine.version == pref.version {
                    defaults.push(engine.clone());
                }
            }
        }
        return defaults;
    }

    let mut selected: BTreeMap<&str, &InstalledEngine> = BTreeMap::new();
    for engine in catalog.iter() {
        match selected.get(engine.id.as_str()) {
            None => {
                selected.insert(&engine.id, engine);
            }
            Some(existing) => {
                // Version fields may hold git urls or local paths; those do
                // not parse and leave the existing selection in place.
                if let (Some(ev), Some(cv)) = (
                    parse_version_lenient(&existing.version),
                    parse_version_lenient(&engine.version),
                ) {
                    if cv > ev {
                        selected.insert(&engine.id, engine);
                    }
                }
            }
        }
    }
    selected.into_values().cloned().collect()
}
