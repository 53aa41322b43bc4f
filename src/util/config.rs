//! User configuration for pontoon.
//!
//! Configuration lives in `~/.pontoon/config.toml` (the whole directory can
//! be relocated with the `PONTOON_HOME` environment variable):
//!
//! ```toml
//! # Preferred default engines, as id:version pairs.
//! default_engines = "android:14.0.0,ios:7.1.0"
//!
//! # The platform CLI tool pontoon shells out to.
//! tool = "cordova"
//! ```
//!
//! A missing file is not an error; every field has a default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the external platform CLI when the config does not override it.
pub const DEFAULT_TOOL: &str = "cordova";

/// Pontoon user configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred default engines as a `id:version[,id:version...]` string.
    ///
    /// Kept as the raw wire format; parsing into typed pairs happens in the
    /// defaults resolver, which rejects malformed pairs individually.
    pub default_engines: Option<String>,

    /// Name (or path) of the platform CLI binary.
    pub tool: Option<String>,

    /// Directory holding the installed-engine catalog. Defaults to
    /// `<pontoon home>/engines`.
    pub engines_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load the user config, falling back to defaults when the file is
    /// absent or unreadable. A malformed file is reported once and ignored.
    pub fn load_or_default() -> Self {
        let path = config_path();
        if !path.exists() {
            return Config::default();
        }
        match Config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring user config: {:#}", e);
                Config::default()
            }
        }
    }

    /// The platform CLI binary name.
    pub fn tool_name(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    /// The engine catalog directory.
    pub fn engines_dir(&self) -> PathBuf {
        self.engines_dir
            .clone()
            .unwrap_or_else(|| pontoon_home().join("engines"))
    }
}

/// The pontoon home directory: `$PONTOON_HOME` or `~/.pontoon`.
pub fn pontoon_home() -> PathBuf {
    if let Some(home) = std::env::var_os("PONTOON_HOME") {
        return PathBuf::from(home);
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".pontoon"))
        .unwrap_or_else(|| PathBuf::from(".pontoon"))
}

/// Path of the user config file.
pub fn config_path() -> PathBuf {
    pontoon_home().join("config.toml")
}
