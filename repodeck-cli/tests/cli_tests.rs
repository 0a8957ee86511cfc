use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use repodeck_core::{store, Label};

fn repodeck_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repodeck"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn make_repo(workspace: &TempDir, name: &str) -> PathBuf {
    let dir = workspace.path().join(name);
    fs::create_dir_all(&dir).expect("create repo dir");
    dir.canonicalize().expect("canonical repo dir")
}

/// Registry with `web` then `api`, created through the CLI.
fn two_repo_home() -> (TempDir, TempDir) {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let web = make_repo(&workspace, "web");
    let api = make_repo(&workspace, "api");

    repodeck_cmd(home.path())
        .args(["init"])
        .arg(&web)
        .assert()
        .success()
        .stdout(contains("Registered 'web'"));
    repodeck_cmd(home.path())
        .arg("manage")
        .write_stdin(format!("add\napi\n{}\napply\n", api.display()))
        .assert()
        .success()
        .stdout(contains("applied 2 repositories; reloading 'web'"));

    (home, workspace)
}

fn labels(home: &Path) -> Vec<String> {
    store::load_at(home)
        .expect("load registry")
        .labels()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn init_defaults_label_to_directory_name_and_is_idempotent() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let web = make_repo(&workspace, "web");
    let other = make_repo(&workspace, "other");

    repodeck_cmd(home.path())
        .arg("init")
        .arg(&web)
        .assert()
        .success();
    repodeck_cmd(home.path())
        .args(["init", "--label", "second"])
        .arg(&other)
        .assert()
        .success()
        .stdout(contains("Registry already exists"));

    assert_eq!(labels(home.path()), ["web"]);
    assert_eq!(
        store::load_active_at(home.path()).expect("active"),
        Some(Label::from("web"))
    );
}

#[test]
fn init_rejects_missing_directory() {
    let home = TempDir::new().expect("home");
    repodeck_cmd(home.path())
        .args(["init", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(contains("cannot resolve path"));
    assert!(!store::registry_path_at(home.path()).exists());
}

#[test]
fn list_without_registry_points_at_init() {
    let home = TempDir::new().expect("home");
    repodeck_cmd(home.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("repodeck init"));
}

#[test]
fn list_json_marks_active_entry() {
    let (home, _workspace) = two_repo_home();
    let output = repodeck_cmd(home.path())
        .args(["list", "--json"])
        .output()
        .expect("run list");
    assert!(output.status.success());

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rows = listed.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["label"], "web");
    assert_eq!(rows[0]["position"], 1);
    assert_eq!(rows[0]["active"], true);
    assert_eq!(rows[1]["label"], "api");
    assert_eq!(rows[1]["active"], false);
}

#[test]
fn switch_menu_lists_entries_then_manage_choice() {
    let (home, _workspace) = two_repo_home();
    repodeck_cmd(home.path())
        .arg("switch")
        .assert()
        .success()
        .stdout(contains("web").and(contains("api")).and(contains("Manage repos...")));
}

#[test]
fn switch_persists_active_label() {
    let (home, _workspace) = two_repo_home();
    repodeck_cmd(home.path())
        .args(["switch", "api"])
        .assert()
        .success()
        .stdout(contains("Switched to 'api'"));
    assert_eq!(
        store::load_active_at(home.path()).expect("active"),
        Some(Label::from("api"))
    );

    repodeck_cmd(home.path())
        .args(["switch", "nope"])
        .assert()
        .failure()
        .stderr(contains("unknown repository 'nope'"));
}

#[test]
fn single_repo_without_management_is_static() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let web = make_repo(&workspace, "web");
    repodeck_cmd(home.path()).arg("init").arg(&web).assert().success();
    fs::write(
        home.path().join(".repodeck").join("config.yaml"),
        "manage_repos_enabled: false\n",
    )
    .expect("write config");

    repodeck_cmd(home.path())
        .arg("switch")
        .assert()
        .success()
        .stdout(contains("web").and(contains("Manage repos...").not()));
    repodeck_cmd(home.path())
        .arg("manage")
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(contains("repository management is disabled"));
}

#[test]
fn validate_reports_local_then_backend_failures() {
    let (home, workspace) = two_repo_home();
    let fresh = make_repo(&workspace, "docs");

    repodeck_cmd(home.path())
        .args(["validate", "web"])
        .arg(&fresh)
        .assert()
        .failure()
        .stderr(contains("Label 'web' already exists"));

    let missing = workspace.path().join("missing");
    repodeck_cmd(home.path())
        .args(["validate", "docs"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(contains("does not exist"));

    repodeck_cmd(home.path())
        .args(["validate", "docs"])
        .arg(&fresh)
        .assert()
        .success()
        .stdout(contains("can be added"));
}

#[test]
fn manage_cannot_remove_last_repository() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let web = make_repo(&workspace, "web");
    repodeck_cmd(home.path()).arg("init").arg(&web).assert().success();

    repodeck_cmd(home.path())
        .arg("manage")
        .write_stdin("rm 1\nquit\n")
        .assert()
        .success()
        .stdout(
            contains("At least one repository is required")
                .and(contains("Remove 'web'?").not()),
        );
    assert_eq!(labels(home.path()), ["web"]);
}

#[test]
fn manage_reorder_and_remove_active_switches_to_first() {
    let (home, _workspace) = two_repo_home();

    repodeck_cmd(home.path())
        .arg("manage")
        .write_stdin("down 1\nrm 2\ny\napply\n")
        .assert()
        .success()
        .stdout(contains("switched to 'api'"));

    assert_eq!(labels(home.path()), ["api"]);
    assert_eq!(
        store::load_active_at(home.path()).expect("active"),
        Some(Label::from("api"))
    );
}

#[test]
fn manage_against_unreachable_server_reports_network_error() {
    let (home, _workspace) = two_repo_home();

    repodeck_cmd(home.path())
        .args(["manage", "--server", "http://127.0.0.1:9"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(contains("failed to load registry from http://127.0.0.1:9"));
}

#[test]
fn daemon_status_when_not_running() {
    let home = TempDir::new().expect("home");
    let output = repodeck_cmd(home.path())
        .args(["daemon", "status", "--server", "http://127.0.0.1:9"])
        .output()
        .expect("run status");
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(status["running"], false);
    assert_eq!(status["url"], "http://127.0.0.1:9");
}

#[test]
fn manage_reorder_without_stored_selection_keeps_resolved_active() {
    let (home, _workspace) = two_repo_home();
    fs::remove_file(store::active_path_at(home.path())).expect("drop active");

    repodeck_cmd(home.path())
        .arg("manage")
        .write_stdin("up 2\napply\n")
        .assert()
        .success()
        .stdout(contains("reloading 'web'"));

    assert_eq!(labels(home.path()), ["api", "web"]);
    assert_eq!(
        store::load_active_at(home.path()).expect("active"),
        Some(Label::from("web"))
    );
}
