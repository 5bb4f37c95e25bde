// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{GitQuery, GixBackend, ShellBackend};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

#[test]
fn test_gix_backend_is_git_repo() {
    let temp = temp_dir();
    assert!(!GixBackend::is_git_repo(temp.path()));

    gix::init(temp.path()).expect("failed to init repo");
    assert!(GixBackend::is_git_repo(temp.path()));
}

#[test]
fn test_gix_backend_bare_is_not_a_work_tree() {
    let temp = temp_dir();
    gix::init_bare(temp.path()).expect("failed to init bare repo");

    assert!(!GixBackend::is_git_repo(temp.path()));
    let err = GixBackend::workdir(temp.path()).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"git error: gix error: repository has no worktree (bare repository)"
    );
}

#[test]
fn test_gix_current_branch_unborn() {
    let temp = temp_dir();
    gix::init(temp.path()).expect("failed to init repo");

    // HEAD of a fresh repository names the unborn default branch
    let branch = GixBackend::current_branch(temp.path()).unwrap();
    assert!(branch.is_some());
}

#[test]
fn test_gix_has_uncommitted_changes_untracked_file() {
    let temp = temp_dir();
    for args in [
        &["init", "-q", "-b", "main"][..],
        &["-c", "user.name=Test", "-c", "user.email=test@example.com", "commit", "-q", "--allow-empty", "-m", "init"],
    ] {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(temp.path())
            .status()
            .expect("failed to run git");
        assert!(status.success());
    }
    assert!(!GixBackend::has_uncommitted_changes(temp.path()).unwrap());

    std::fs::write(temp.path().join("App.csproj"), "<Project />").unwrap();
    assert!(GixBackend::has_uncommitted_changes(temp.path()).unwrap());
}

#[tokio::test]
async fn test_shell_backend_reports_stderr() {
    let temp = temp_dir();
    let shell = ShellBackend::new(temp.path(), None).expect("git should be installed");

    let err = shell.git(&["rev-parse", "--is-inside-work-tree"]).await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("git error: git command failed: git rev-parse"));
    assert!(message.contains("not a git repository"), "{message}");
}

#[tokio::test]
async fn test_shell_backend_returns_trimmed_stdout() {
    let temp = temp_dir();
    gix::init(temp.path()).expect("failed to init repo");
    let shell = ShellBackend::new(temp.path(), None).expect("git should be installed");

    let out = shell
        .git(&["rev-parse", "--is-inside-work-tree"])
        .await
        .unwrap();
    assert_eq!(out, "true");
}
