//! Version and location matching for engine refs.
//!
//! The manifest stores version specs that may begin with the semver range
//! markers `~` or `^`. Catalog versions never carry these, so matching
//! strips exactly one marker and compares the remainder verbatim; no real
//! range semantics are implemented. Numeric ordering only happens during
//! default-engine selection, via [`parse_version_lenient`].

use std::path::Path;

use semver::Version;

use crate::core::engine::{EngineRef, InstalledEngine};

/// Does a declared version spec match an installed engine version?
///
/// Strips one leading `~` or `^` from the spec, then compares exactly.
pub fn spec_matches(spec: &str, version: &str) -> bool {
    let spec = spec
        .strip_prefix('~')
        .or_else(|| spec.strip_prefix('^'))
        .unwrap_or(spec);
    spec == version
}

/// Does a declared path spec match an unmanaged engine's location?
///
/// The spec must look like a path and be path-equal (component-wise, so
/// trailing separators are tolerated) to the engine location. A version
/// string never matches here.
pub fn location_matches(spec: &str, location: &Path) -> bool {
    if spec.is_empty() || spec.contains('\0') {
        return false;
    }
    Path::new(spec).components().eq(location.components())
}

/// Does a manifest ref match an installed engine?
///
/// Managed engines match on id plus [`spec_matches`]; unmanaged engines
/// match on location only.
pub fn engine_matches(r: &EngineRef, engine: &InstalledEngine) -> bool {
    if engine.managed {
        r.name == engine.id && spec_matches(&r.spec, &engine.version)
    } else {
        engine
            .location()
            .is_some_and(|loc| location_matches(&r.spec, loc))
    }
}

/// Parse a version string, allowing for incomplete versions.
///
/// Returns `None` for anything that does not look like a version (git URLs,
/// local paths); callers treat that as "cannot be ordered".
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    // Try exact parse first
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    // Try adding missing components
    let parts: Vec<&str> = s.split('.').collect();
    match parts.len() {
        1 => {
            let major: u64 = parts[0].parse().ok()?;
            Some(Version::new(major, 0, 0))
        }
        2 => {
            let major: u64 = parts[0].parse().ok()?;
            let minor: u64 = parts[1].parse().ok()?;
            Some(Version::new(major, minor, 0))
        }
        _ => None,
    }
}
