//! CLI integration tests for Pontoon.
//!
//! These tests run the binary against throwaway projects with a fake
//! pontoon home: a directory catalog plus a stub platform tool that records
//! its invocations.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// A fake `~/.pontoon` with a catalog and a stub platform tool.
struct Home {
    dir: TempDir,
}

impl Home {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("engines")).unwrap();
        Home { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn add_engine(&self, id: &str, version: &str) {
        fs::create_dir_all(self.path().join("engines").join(id).join(version)).unwrap();
    }

    fn calls_log(&self) -> PathBuf {
        self.path().join("calls.log")
    }

    /// Install a stub tool that logs its arguments and configure pontoon
    /// to use it.
    #[cfg(unix)]
    fn with_stub_tool(self) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let tool = self.path().join("fake-cordova");
        fs::write(
            &tool,
            format!("#!/bin/sh\necho \"$@\" >> {}\n", self.calls_log().display()),
        )
        .unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        fs::write(
            self.path().join("config.toml"),
            format!("tool = \"{}\"\n", tool.display()),
        )
        .unwrap();
        self
    }

    fn set_preference(&self, pref: &str) {
        let config_path = self.path().join("config.toml");
        let mut config = fs::read_to_string(&config_path).unwrap_or_default();
        config.push_str(&format!("default_engines = \"{}\"\n", pref));
        fs::write(&config_path, config).unwrap();
    }
}

/// Get the pontoon binary command bound to a home and project.
fn pontoon(home: &Home, project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pontoon").unwrap();
    cmd.env("PONTOON_HOME", home.path());
    cmd.args(["--project", &project.display().to_string()]);
    cmd
}

fn project_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write_manifest(project: &Path, contents: &str) {
    fs::write(project.join("Pontoon.toml"), contents).unwrap();
}

fn write_platforms_json(project: &Path, contents: &str) {
    fs::create_dir_all(project.join("platforms")).unwrap();
    fs::write(project.join("platforms/platforms.json"), contents).unwrap();
}

// ============================================================================
// pontoon engines list
// ============================================================================

#[test]
fn test_list_prefers_platforms_state_over_manifest() {
    let home = Home::new();
    home.add_engine("android", "14.0.0");
    home.add_engine("ios", "7.1.0");

    let tmp = project_dir();
    write_manifest(tmp.path(), "[[engines]]\nname = \"ios\"\nspec = \"7.1.0\"\n");
    write_platforms_json(tmp.path(), r#"{"android": "14.0.0"}"#);

    pontoon(&home, tmp.path())
        .args(["engines", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source: platforms.json"))
        .stdout(predicate::str::contains("android"))
        .stdout(predicate::str::contains("ios").not());
}

#[test]
fn test_list_matches_manifest_refs_with_range_prefix() {
    let home = Home::new();
    home.add_engine("android", "14.0.0");

    let tmp = project_dir();
    write_manifest(
        tmp.path(),
        "[[engines]]\nname = \"android\"\nspec = \"^14.0.0\"\n",
    );

    pontoon(&home, tmp.path())
        .args(["engines", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source: manifest"))
        .stdout(predicate::str::contains("14.0.0"));
}

#[test]
fn test_list_falls_back_to_defaults() {
    let home = Home::new();
    home.add_engine("android", "13.0.0");
    home.add_engine("android", "14.0.0");

    let tmp = project_dir();

    pontoon(&home, tmp.path())
        .args(["engines", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source: defaults"))
        .stdout(predicate::str::contains("14.0.0"))
        .stdout(predicate::str::contains("13.0.0").not());
}

#[test]
fn test_list_with_nothing_installed() {
    let home = Home::new();
    let tmp = project_dir();

    pontoon(&home, tmp.path())
        .args(["engines", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no active engines"));
}

// ============================================================================
// pontoon engines defaults
// ============================================================================

#[test]
fn test_defaults_picks_highest_version_per_platform() {
    let home = Home::new();
    home.add_engine("android", "13.0.0");
    home.add_engine("android", "14.0.0");
    home.add_engine("ios", "7.1.0");

    let tmp = project_dir();

    pontoon(&home, tmp.path())
        .args(["engines", "defaults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("14.0.0"))
        .stdout(predicate::str::contains("7.1.0"))
        .stdout(predicate::str::contains("13.0.0").not());
}

#[cfg(unix)]
#[test]
fn test_defaults_honors_preference() {
    let home = Home::new().with_stub_tool();
    home.add_engine("android", "13.0.0");
    home.add_engine("android", "14.0.0");
    home.set_preference("android:13.0.0");

    let tmp = project_dir();

    pontoon(&home, tmp.path())
        .args(["engines", "defaults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("13.0.0"))
        .stdout(predicate::str::contains("14.0.0").not());
}

// ============================================================================
// pontoon engines set
// ============================================================================

#[test]
fn test_set_dry_run_prints_plan() {
    let home = Home::new();
    home.add_engine("android", "14.0.0");

    let tmp = project_dir();
    write_manifest(
        tmp.path(),
        "[[engines]]\nname = \"windows\"\nspec = \"9.0.0\"\n",
    );

    pontoon(&home, tmp.path())
        .args(["engines", "set", "--dry-run", "android@14.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- windows"))
        .stdout(predicate::str::contains("+ android@14.0.0"));
}

#[cfg(unix)]
#[test]
fn test_set_rewrites_manifest_and_invokes_tool() {
    let home = Home::new().with_stub_tool();
    home.add_engine("android", "14.0.0");

    let tmp = project_dir();
    write_manifest(
        tmp.path(),
        "# my project\n[[engines]]\nname = \"windows\"\nspec = \"9.0.0\"\n",
    );

    pontoon(&home, tmp.path())
        .args(["engines", "set", "android@14.0.0"])
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("Pontoon.toml")).unwrap();
    assert!(manifest.starts_with("# my project"));
    assert!(manifest.contains("android"));
    assert!(!manifest.contains("windows"));

    let calls = fs::read_to_string(home.calls_log()).unwrap();
    assert!(calls.contains("platform remove windows"));
    assert!(calls.contains("prepare"));
}

#[cfg(unix)]
#[test]
fn test_set_is_idempotent() {
    let home = Home::new().with_stub_tool();
    home.add_engine("ios", "7.1.0");

    let tmp = project_dir();
    write_manifest(tmp.path(), "[[engines]]\nname = \"ios\"\nspec = \"7.1.0\"\n");
    let before = fs::read_to_string(tmp.path().join("Pontoon.toml")).unwrap();

    pontoon(&home, tmp.path())
        .args(["engines", "set", "ios@7.1.0"])
        .assert()
        .success();

    let after = fs::read_to_string(tmp.path().join("Pontoon.toml")).unwrap();
    assert_eq!(before, after);

    let calls = fs::read_to_string(home.calls_log()).unwrap();
    assert!(!calls.contains("remove"));
}

#[test]
fn test_set_rejects_unknown_version_with_hint() {
    let home = Home::new();
    home.add_engine("android", "13.0.0");

    let tmp = project_dir();

    pontoon(&home, tmp.path())
        .args(["engines", "set", "android@99.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"))
        .stderr(predicate::str::contains("13.0.0"));
}

#[test]
fn test_set_rejects_unsupported_platform() {
    let home = Home::new();
    let tmp = project_dir();

    pontoon(&home, tmp.path())
        .args(["engines", "set", "blackberry10@3.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported platform"));
}

#[test]
fn test_set_rejects_malformed_engine_arg() {
    let home = Home::new();
    let tmp = project_dir();

    pontoon(&home, tmp.path())
        .args(["engines", "set", "android"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("id@version"));
}
