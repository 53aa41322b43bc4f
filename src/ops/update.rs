//! Engine reconciliation: the write path.
//!
//! [`plan`] computes the minimal delta between the previously declared
//! engine refs and a newly desired engine set. [`update_engines`] applies a
//! plan as a background unit of work: it removes stale platforms through the
//! external CLI, rewrites the manifest engine list, runs `prepare` (which
//! derives its actions from the saved manifest, so ordering matters), and
//! refreshes the project's on-disk view, all while holding the project's
//! exclusive modification lock.
//!
//! External command failures never abort the op; they are folded into the
//! aggregate [`UpdateStatus`]. Manifest edits that already happened persist.
//! Only manifest acquisition/persistence failures surface as errors.

use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;

use thiserror::Error;

use crate::core::engine::{EngineRef, InstalledEngine};
use crate::core::manifest::ManifestEdit;
use crate::core::project::HybridProject;
use crate::ops::platform_cli::PlatformCli;
use crate::util::progress::ProgressToken;

/// The computed reconciliation delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Platform names whose previous refs have no counterpart in the
    /// desired set; each gets an external `platform remove`.
    pub removals: Vec<String>,

    /// The final manifest refs, one per desired engine, in desired order.
    pub refs: Vec<EngineRef>,

    /// Whether the manifest engine list needs rewriting.
    pub changed: bool,
}

/// Compute the delta between the previously declared refs and the desired
/// engine set.
///
/// A previous ref survives when some desired engine has the same platform
/// name and its spec string (version, or location for unmanaged engines)
/// equals the ref's spec verbatim, so a `^`-prefixed ref counts as stale
/// and is replaced by a plain one. Applying the same desired set twice
/// yields an empty, unchanged plan.
pub fn plan(desired: &[InstalledEngine], previous: &[EngineRef]) -> ReconcilePlan {
    let removals = previous
        .iter()
        .filter(|r| {
            !desired
                .iter()
                .any(|e| e.id == r.name && e.spec_string() == r.spec)
        })
        .map(|r| r.name.clone())
        .collect();

    let refs: Vec<EngineRef> = desired.iter().map(EngineRef::for_engine).collect();
    let changed = refs != previous;

    ReconcilePlan {
        removals,
        refs,
        changed,
    }
}

/// Aggregate result of an engine update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Everything completed.
    Ok,
    /// The update completed but some external command misbehaved.
    Warning(String),
    /// The final `prepare` failed; manifest edits persist regardless.
    Failed(String),
    /// Cancelled before a sub-step started; completed sub-steps persist.
    Cancelled,
}

impl UpdateStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, UpdateStatus::Ok)
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::Ok => write!(f, "ok"),
            UpdateStatus::Warning(msg) => write!(f, "completed with warnings: {}", msg),
            UpdateStatus::Failed(msg) => write!(f, "failed: {}", msg),
            UpdateStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Failures that abort the update instead of degrading its status.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("could not open project manifest for edit: {0:#}")]
    Manifest(anyhow::Error),

    #[error("could not persist project manifest: {0:#}")]
    Persist(anyhow::Error),

    #[error("engine update worker panicked")]
    Worker,
}

/// Handle to a scheduled engine update.
pub struct UpdateHandle {
    worker: JoinHandle<Result<UpdateStatus, UpdateError>>,
    progress: ProgressToken,
}

impl UpdateHandle {
    /// The shared progress/cancellation token.
    pub fn progress(&self) -> &ProgressToken {
        &self.progress
    }

    /// Whether the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the update to finish.
    pub fn join(self) -> Result<UpdateStatus, UpdateError> {
        self.worker.join().map_err(|_| UpdateError::Worker)?
    }
}

/// Schedule an engine update as a background unit of work.
///
/// The returned handle exposes the progress token for monitoring and
/// cancellation; cancellation stops the op before its next sub-step but
/// never rolls back a committed one.
pub fn update_engines(
    project: HybridProject,
    desired: Vec<InstalledEngine>,
    cli: Arc<dyn PlatformCli>,
) -> UpdateHandle {
    let progress = ProgressToken::new();
    let token = progress.clone();
    let worker = std::thread::spawn(move || {
        update_engines_blocking(&project, &desired, cli.as_ref(), &token)
    });
    UpdateHandle { worker, progress }
}

/// Run an engine update on the calling thread.
///
/// Holds the project's exclusive modification lock for the whole operation,
/// serialising it against other structural edits to the same project.
pub fn update_engines_blocking(
    project: &HybridProject,
    desired: &[InstalledEngine],
    cli: &dyn PlatformCli,
    progress: &ProgressToken,
) -> Result<UpdateStatus, UpdateError> {
    let lock = project.modify_lock();
    let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

    let mut manifest = ManifestEdit::open(&project.manifest_path()).map_err(UpdateError::Manifest)?;
    let previous = manifest.engine_refs();
    let plan = plan(desired, &previous);

    tracing::info!(
        "updating engines for {}: {} removal(s), {} declared",
        project.name(),
        plan.removals.len(),
        plan.refs.len()
    );
    // removals + save + prepare + refresh
    progress.begin(plan.removals.len() as u32 + 3);

    let mut warnings = Vec::new();
    for name in &plan.removals {
        if progress.is_cancelled() {
            return Ok(UpdateStatus::Cancelled);
        }
        let outcome = cli.platform_remove(name, progress);
        if !outcome.success {
            tracing::warn!("platform remove {} failed: {}", name, outcome.summary);
            warnings.push(outcome.summary);
        }
        progress.worked(1);
    }

    if progress.is_cancelled() {
        return Ok(UpdateStatus::Cancelled);
    }
    if plan.changed {
        manifest.set_engine_refs(&plan.refs);
        manifest.save().map_err(UpdateError::Persist)?;
    }
    progress.worked(1);

    if progress.is_cancelled() {
        return Ok(UpdateStatus::Cancelled);
    }
    // prepare must run after the manifest reflects the final state; it
    // derives its actions from the manifest.
    let prepared = cli.prepare(progress);
    progress.worked(1);

    project.refresh();
    progress.worked(1);

    if !prepared.success {
        return Ok(UpdateStatus::Failed(prepared.summary));
    }
    if !warnings.is_empty() {
        return Ok(UpdateStatus::Warning(warnings.join("; ")));
    }
    Ok(UpdateStatus::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::platform_cli::CliOutcome;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Fake CLI recording calls; optionally fails prepare or removes.
    struct RecordingCli {
        calls: Mutex<Vec<String>>,
        fail_prepare: bool,
        fail_remove: bool,
        manifest_at_prepare: Mutex<Option<String>>,
        manifest_path: std::path::PathBuf,
    }

    impl RecordingCli {
        fn new(manifest_path: std::path::PathBuf) -> Self {
            RecordingCli {
                calls: Mutex::new(Vec::new()),
                fail_prepare: false,
                fail_remove: false,
                manifest_at_prepare: Mutex::new(None),
                manifest_path,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PlatformCli for RecordingCli {
        fn platform_add(&self, name: &str, _progress: &ProgressToken) -> CliOutcome {
            self.calls.lock().unwrap().push(format!("add {}", name));
            CliOutcome::ok("added")
        }

        fn platform_remove(&self, name: &str, _progress: &ProgressToken) -> CliOutcome {
            self.calls.lock().unwrap().push(format!("remove {}", name));
            if self.fail_remove {
                CliOutcome::failed(format!("cannot remove {}", name))
            } else {
                CliOutcome::ok("removed")
            }
        }

        fn prepare(&self, _progress: &ProgressToken) -> CliOutcome {
            self.calls.lock().unwrap().push("prepare".to_string());
            *self.manifest_at_prepare.lock().unwrap() =
                std::fs::read_to_string(&self.manifest_path).ok();
            if self.fail_prepare {
                CliOutcome::failed("Error: prepare failed")
            } else {
                CliOutcome::ok("prepared")
            }
        }
    }

    fn project_with_manifest(tmp: &TempDir, manifest: &str) -> HybridProject {
        std::fs::write(tmp.path().join("Pontoon.toml"), manifest).unwrap();
        HybridProject::open(tmp.path()).unwrap()
    }

    #[test]
    fn plan_removes_stale_and_declares_desired() {
        let previous = vec![
            EngineRef::new("android", "13.0.0"),
            EngineRef::new("windows", "9.0.0"),
        ];
        let desired = vec![
            InstalledEngine::managed("android", "14.0.0"),
            InstalledEngine::unmanaged("browser", "/opt/sdk/browser"),
        ];

        let p = plan(&desired, &previous);
        assert_eq!(p.removals, vec!["android", "windows"]);
        assert_eq!(
            p.refs,
            vec![
                EngineRef::new("android", "14.0.0"),
                EngineRef::new("browser", "/opt/sdk/browser"),
            ]
        );
        assert!(p.changed);
    }

    #[test]
    fn plan_is_idempotent() {
        let desired = vec![
            InstalledEngine::managed("android", "14.0.0"),
            InstalledEngine::managed("ios", "7.1.0"),
        ];
        let first = plan(&desired, &[]);
        let second = plan(&desired, &first.refs);
        assert!(second.removals.is_empty());
        assert!(!second.changed);
        assert_eq!(second.refs, first.refs);
    }

    #[test]
    fn prefixed_ref_counts_as_stale() {
        let previous = vec![EngineRef::new("android", "^14.0.0")];
        let desired = vec![InstalledEngine::managed("android", "14.0.0")];

        let p = plan(&desired, &previous);
        assert_eq!(p.removals, vec!["android"]);
        assert_eq!(p.refs, vec![EngineRef::new("android", "14.0.0")]);
    }

    #[test]
    fn update_removes_then_saves_then_prepares() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_manifest(
            &tmp,
            "[[engines]]\nname = \"windows\"\nspec = \"9.0.0\"\n",
        );
        let cli = RecordingCli::new(project.manifest_path());
        let desired = vec![InstalledEngine::managed("android", "14.0.0")];

        let status =
            update_engines_blocking(&project, &desired, &cli, &ProgressToken::new()).unwrap();
        assert_eq!(status, UpdateStatus::Ok);
        assert_eq!(cli.calls(), vec!["remove windows", "prepare"]);

        // prepare must have seen the manifest already reflecting the
        // desired set.
        let seen = cli.manifest_at_prepare.lock().unwrap().clone().unwrap();
        assert!(seen.contains("android"));
        assert!(!seen.contains("windows"));
    }

    #[test]
    fn prepare_failure_is_failed_status_with_manifest_persisted() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_manifest(&tmp, "");
        let mut cli = RecordingCli::new(project.manifest_path());
        cli.fail_prepare = true;
        let desired = vec![InstalledEngine::managed("ios", "7.1.0")];

        let status =
            update_engines_blocking(&project, &desired, &cli, &ProgressToken::new()).unwrap();
        assert!(matches!(status, UpdateStatus::Failed(_)));

        let written = std::fs::read_to_string(project.manifest_path()).unwrap();
        assert!(written.contains("ios"));
    }

    #[test]
    fn remove_failure_degrades_to_warning() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_manifest(
            &tmp,
            "[[engines]]\nname = \"windows\"\nspec = \"9.0.0\"\n",
        );
        let mut cli = RecordingCli::new(project.manifest_path());
        cli.fail_remove = true;

        let status = update_engines_blocking(&project, &[], &cli, &ProgressToken::new()).unwrap();
        assert!(matches!(status, UpdateStatus::Warning(_)));
    }

    #[test]
    fn cancelled_before_start_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_manifest(
            &tmp,
            "[[engines]]\nname = \"windows\"\nspec = \"9.0.0\"\n",
        );
        let cli = RecordingCli::new(project.manifest_path());
        let progress = ProgressToken::new();
        progress.cancel();

        let status = update_engines_blocking(&project, &[], &cli, &progress).unwrap();
        assert_eq!(status, UpdateStatus::Cancelled);
        assert!(cli.calls().is_empty());
        let written = std::fs::read_to_string(project.manifest_path()).unwrap();
        assert!(written.contains("windows"));
    }

    #[test]
    fn idempotent_update_leaves_manifest_bytes_alone() {
        let tmp = TempDir::new().unwrap();
        let original = "# keep me\n[[engines]]\nname = \"android\"\nspec = \"14.0.0\"\n";
        let project = project_with_manifest(&tmp, original);
        let cli = RecordingCli::new(project.manifest_path());
        let desired = vec![InstalledEngine::managed("android", "14.0.0")];

        let status =
            update_engines_blocking(&project, &desired, &cli, &ProgressToken::new()).unwrap();
        assert_eq!(status, UpdateStatus::Ok);
        assert_eq!(cli.calls(), vec!["prepare"]);
        assert_eq!(
            std::fs::read_to_string(project.manifest_path()).unwrap(),
            original
        );
    }

    #[test]
    fn scheduled_update_joins_with_status() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_manifest(&tmp, "");
        let cli = Arc::new(RecordingCli::new(project.manifest_path()));
        let desired = vec![InstalledEngine::managed("browser", "6.0.0")];

        let handle = update_engines(project.clone(), desired, cli);
        let status = handle.join().unwrap();
        assert_eq!(status, UpdateStatus::Ok);

        let written = std::fs::read_to_string(project.manifest_path()).unwrap();
        assert!(written.contains("browser"));
    }
}
