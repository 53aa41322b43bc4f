//! External platform CLI invocation.
//!
//! The actual install/remove/prepare work is done by the project's platform
//! tool (`cordova` unless the user config overrides it). The [`PlatformCli`]
//! trait is the seam the update op depends on; [`ToolCli`] is the real
//! subprocess-backed implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::project::HybridProject;
use crate::util::process::ProcessBuilder;
use crate::util::progress::ProgressToken;
use crate::util::Config;

/// Classified result of one external command.
#[derive(Debug, Clone)]
pub struct CliOutcome {
    pub success: bool,
    pub summary: String,
}

impl CliOutcome {
    pub fn ok(summary: impl Into<String>) -> Self {
        CliOutcome {
            success: true,
            summary: summary.into(),
        }
    }

    pub fn failed(summary: impl Into<String>) -> Self {
        CliOutcome {
            success: false,
            summary: summary.into(),
        }
    }
}

/// Project-bound runner for platform commands.
///
/// Implementations never panic on command failure; failures are encoded in
/// the returned [`CliOutcome`] and aggregated by the caller.
pub trait PlatformCli: Send + Sync {
    /// `platform add <name>`
    fn platform_add(&self, name: &str, progress: &ProgressToken) -> CliOutcome;

    /// `platform remove <name>`
    fn platform_remove(&self, name: &str, progress: &ProgressToken) -> CliOutcome;

    /// `prepare`, which restores platforms to match the manifest.
    fn prepare(&self, progress: &ProgressToken) -> CliOutcome;
}

/// The real platform CLI, invoked as a subprocess in the project root.
#[derive(Debug, Clone)]
pub struct ToolCli {
    program: PathBuf,
    project_root: PathBuf,
}

impl ToolCli {
    /// Locate the platform tool for a project.
    pub fn for_project(project: &HybridProject, config: &Config) -> Result<Self> {
        let name = config.tool_name();
        let program = which::which(name)
            .with_context(|| format!("platform tool `{}` not found on PATH", name))?;
        Ok(ToolCli {
            program,
            project_root: project.root().to_path_buf(),
        })
    }

    fn run(&self, args: &[&str], progress: &ProgressToken) -> CliOutcome {
        let builder = ProcessBuilder::new(&self.program)
            .args(args)
            .cwd(&self.project_root);
        progress.set_step(builder.display());
        tracing::debug!("running `{}`", builder.display());

        let output = match builder.exec() {
            Ok(output) => output,
            Err(e) => return CliOutcome::failed(format!("{:#}", e)),
        };
        classify(&builder.display(), &output)
    }
}

impl PlatformCli for ToolCli {
    fn platform_add(&self, name: &str, progress: &ProgressToken) -> CliOutcome {
        self.run(&["platform", "add", name], progress)
    }

    fn platform_remove(&self, name: &str, progress: &ProgressToken) -> CliOutcome {
        self.run(&["platform", "remove", name], progress)
    }

    fn prepare(&self, progress: &ProgressToken) -> CliOutcome {
        self.run(&["prepare"], progress)
    }
}

/// Classify tool output into a success/failure outcome.
///
/// The platform tool reports some failures with exit code 0 and an
/// `Error:`-prefixed diagnostic on stdout or stderr, so both channels are
/// scanned in addition to the exit status.
fn classify(command: &str, output: &std::process::Output) -> CliOutcome {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let error_line = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|l| l.starts_with("Error:") || l.starts_with("Error "));

    if let Some(line) = error_line {
        return CliOutcome::failed(format!("`{}`: {}", command, line));
    }
    if !output.status.success() {
        let detail = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no output");
        return CliOutcome::failed(format!("`{}` exited with {}: {}", command, output.status, detail));
    }
    CliOutcome::ok(format!("`{}` completed", command))
}
