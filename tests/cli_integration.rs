//! Integration tests for the CLI surface.
//!
//! These exercise argument validation and the fatal precondition
//! paths (missing target, missing credential) without touching the
//! network: every case here must fail before the first store call.

use assert_cmd::Command;
use predicates::prelude::*;

fn quill() -> Command {
    let mut cmd = Command::cargo_bin("quill").unwrap();
    // Isolate from the invoking environment.
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("GITHUB_WORKSPACE");
    cmd
}

#[test]
fn no_arguments_shows_usage() {
    quill()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
    quill()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quill"));
}

#[test]
fn commit_requires_a_message() {
    quill()
        .args(["commit", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--message"));
}

#[test]
fn commit_requires_at_least_one_path() {
    quill()
        .args(["commit", "-m", "msg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PATH"));
}

#[test]
fn missing_target_repository_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    quill()
        .current_dir(dir.path())
        .args(["commit", "-m", "msg", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no target repository"));
}

#[test]
fn invalid_repo_slug_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    quill()
        .current_dir(dir.path())
        .args(["--repo", "not-a-slug", "commit", "-m", "msg", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --repo"));
}

#[test]
fn missing_credential_fails_before_any_network_call() {
    let dir = tempfile::tempdir().unwrap();
    quill()
        .current_dir(dir.path())
        .args([
            "--repo",
            "octocat/hello-world",
            "commit",
            "-m",
            "msg",
            "a.txt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credential configured"));
}

#[test]
fn repository_slug_falls_back_to_the_environment() {
    let dir = tempfile::tempdir().unwrap();
    // With the repo provided by the environment, resolution proceeds to
    // the credential check, which is still missing.
    quill()
        .current_dir(dir.path())
        .env("GITHUB_REPOSITORY", "octocat/hello-world")
        .args(["delete", "-m", "msg", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credential configured"));
}

#[test]
fn config_file_supplies_the_target() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("quill.toml"),
        "owner = \"octocat\"\nrepo = \"hello-world\"\nbranch = \"main\"\n",
    )
    .unwrap();

    // Target resolution succeeds from the file; failure moves on to the
    // missing credential.
    quill()
        .current_dir(dir.path())
        .args(["commit", "-m", "msg", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credential configured"));
}

#[test]
fn invalid_branch_flag_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    quill()
        .current_dir(dir.path())
        .env("GITHUB_TOKEN", "test-token")
        .args([
            "--repo",
            "octocat/hello-world",
            "--branch",
            "bad branch",
            "commit",
            "-m",
            "msg",
            "a.txt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid repository target"));
}
