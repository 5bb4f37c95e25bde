// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{GitError, RetargetError};
use crate::git::backend::CheckoutMode;
use crate::git::branches::{Branch, BranchName, HeadRef, merge_branches};
use crate::git::repository::GitRepository;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Runs git in `cwd`, panicking with stderr on failure.
fn git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(path: &Path) {
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

/// A `main` branch with one commit.
fn init_repo(path: &Path) {
    git(path, &["init", "-q", "-b", "main"]);
    configure_identity(path);
    std::fs::write(path.join("README.md"), "readme\n").unwrap();
    git(path, &["add", "-A"]);
    git(path, &["commit", "-q", "-m", "Initial commit"]);
}

/// `origin.git` (bare) with `main` and `feature`, cloned into `work`.
fn clone_with_remote_branch(temp: &Path) -> (PathBuf, PathBuf) {
    let seed = temp.join("seed");
    std::fs::create_dir(&seed).unwrap();
    init_repo(&seed);
    git(&seed, &["branch", "feature"]);

    let origin = temp.join("origin.git");
    git(temp, &["clone", "-q", "--bare", "seed", "origin.git"]);
    git(temp, &["clone", "-q", "origin.git", "work"]);

    let work = temp.join("work");
    configure_identity(&work);
    (origin, work)
}

#[test]
fn test_merge_branches_dedupes_and_drops_head() {
    let local = "refs/heads/main\nrefs/heads/dev\n";
    let remote = "refs/remotes/origin/HEAD\nrefs/remotes/origin/main\nrefs/remotes/origin/feature/x\n";

    let branches: Vec<String> = merge_branches(local, remote, "origin")
        .iter()
        .map(ToString::to_string)
        .collect();

    insta::assert_debug_snapshot!(branches, @r#"
    [
        "main (local)",
        "dev (local)",
        "feature/x (remote origin)",
    ]
    "#);
}

#[test]
fn test_merge_branches_is_case_sensitive() {
    let branches = merge_branches("refs/heads/main\n", "refs/remotes/origin/Main\n", "origin");
    assert_eq!(branches, [Branch::local("main"), Branch::remote("Main", "origin")]);
}

#[test]
fn test_merge_branches_ignores_other_namespaces() {
    let branches = merge_branches("", "refs/remotes/upstream/main\n", "origin");
    assert!(branches.is_empty());
}

#[test]
fn test_branch_start_point() {
    assert_eq!(Branch::local("dev").start_point(), "dev");
    assert_eq!(
        Branch::remote("feature", "upstream").start_point(),
        "upstream/feature"
    );
}

#[test]
fn test_head_ref_display() {
    let head = HeadRef::Detached("0123456789abcdef0123".to_string());
    assert_eq!(head.to_string(), "detached at 0123456789ab");
    assert_eq!(HeadRef::Branch(BranchName::new("main")).to_string(), "main");
}

#[test]
fn test_open_rejects_non_repository() {
    let temp = temp_dir();
    let err = GitRepository::open(temp.path(), "origin", None).unwrap_err();
    assert!(matches!(
        err,
        RetargetError::Git(ref git) if matches!(**git, GitError::RepoNotFound { .. })
    ));
}

#[test]
fn test_open_rejects_missing_path() {
    let temp = temp_dir();
    let err = GitRepository::open(&temp.path().join("missing"), "origin", None).unwrap_err();
    assert!(err.to_string().starts_with("git error: not a git repository"));
}

#[test]
fn test_open_resolves_workdir_from_subdirectory() {
    let temp = temp_dir();
    init_repo(temp.path());
    let sub = temp.path().join("src");
    std::fs::create_dir(&sub).unwrap();

    let repo = GitRepository::open(&sub, "origin", None).unwrap();

    assert_eq!(
        repo.workdir().canonicalize().unwrap(),
        temp.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn test_list_branches_local_and_remote_only() {
    let temp = temp_dir();
    let (_origin, work) = clone_with_remote_branch(temp.path());

    let repo = GitRepository::open(&work, "origin", None).unwrap();
    let branches = repo.list_branches().await.unwrap();

    assert_eq!(
        branches,
        [Branch::local("main"), Branch::remote("feature", "origin")]
    );
}

#[tokio::test]
async fn test_checkout_remote_only_creates_tracking_branch() {
    let temp = temp_dir();
    let (_origin, work) = clone_with_remote_branch(temp.path());
    let repo = GitRepository::open(&work, "origin", None).unwrap();

    repo.checkout(&Branch::remote("feature", "origin"), CheckoutMode::Materialize)
        .await
        .unwrap();

    assert_eq!(
        repo.current_head().await.unwrap(),
        HeadRef::Branch(BranchName::new("feature"))
    );
    assert_eq!(
        git(&work, &["rev-parse", "--abbrev-ref", "feature@{upstream}"]),
        "origin/feature"
    );
}

#[tokio::test]
async fn test_checkout_detached_creates_no_refs() {
    let temp = temp_dir();
    let (_origin, work) = clone_with_remote_branch(temp.path());
    let repo = GitRepository::open(&work, "origin", None).unwrap();

    repo.checkout(&Branch::remote("feature", "origin"), CheckoutMode::Detached)
        .await
        .unwrap();

    assert!(matches!(
        repo.current_head().await.unwrap(),
        HeadRef::Detached(_)
    ));
    assert_eq!(git(&work, &["for-each-ref", "refs/heads/feature"]), "");
}

#[tokio::test]
async fn test_checkout_unknown_branch_fails() {
    let temp = temp_dir();
    init_repo(temp.path());
    let repo = GitRepository::open(temp.path(), "origin", None).unwrap();

    let err = repo
        .checkout(&Branch::local("nope"), CheckoutMode::Materialize)
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("git error: failed to checkout nope:"));
}

#[tokio::test]
async fn test_restore_detached_head() {
    let temp = temp_dir();
    init_repo(temp.path());
    let sha = git(temp.path(), &["rev-parse", "HEAD"]);
    git(temp.path(), &["checkout", "-q", "--detach", "HEAD"]);
    let repo = GitRepository::open(temp.path(), "origin", None).unwrap();

    let head = repo.current_head().await.unwrap();
    assert_eq!(head, HeadRef::Detached(sha.clone()));

    git(temp.path(), &["checkout", "-q", "main"]);
    repo.restore(&head).await.unwrap();

    assert_eq!(git(temp.path(), &["rev-parse", "HEAD"]), sha);
    assert_eq!(git(temp.path(), &["branch", "--show-current"]), "");
}

#[tokio::test]
async fn test_stage_commit_and_push() {
    let temp = temp_dir();
    let (origin, work) = clone_with_remote_branch(temp.path());
    let repo = GitRepository::open(&work, "origin", None).unwrap();
    let main = BranchName::new("main");

    std::fs::write(work.join(".gitignore"), ".vs/\n").unwrap();
    assert!(repo.has_uncommitted_changes().await.unwrap());

    repo.stage_all().await.unwrap();
    repo.commit(&main, "Add .vs/ to .gitignore").await.unwrap();
    repo.push(&main).await.unwrap();

    assert!(!repo.has_uncommitted_changes().await.unwrap());
    let subject = git(&origin, &["log", "-1", "--format=%s", "main"]);
    assert_eq!(subject, "Add .vs/ to .gitignore");
}

#[tokio::test]
async fn test_commit_without_changes_fails() {
    let temp = temp_dir();
    init_repo(temp.path());
    let repo = GitRepository::open(temp.path(), "origin", None).unwrap();

    let err = repo
        .commit(&BranchName::new("main"), "nothing")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RetargetError::Git(ref git) if matches!(**git, GitError::CommitFailed { .. })
    ));
}

#[tokio::test]
async fn test_push_without_remote_fails() {
    let temp = temp_dir();
    init_repo(temp.path());
    let repo = GitRepository::open(temp.path(), "origin", None).unwrap();

    let err = repo.push(&BranchName::new("main")).await.unwrap_err();

    assert!(
        err.to_string()
            .starts_with("git error: failed to push main to origin:")
    );
}

#[tokio::test]
async fn test_rollback_discards_tracked_changes() {
    let temp = temp_dir();
    init_repo(temp.path());
    let repo = GitRepository::open(temp.path(), "origin", None).unwrap();

    std::fs::write(temp.path().join("README.md"), "changed\n").unwrap();
    git(temp.path(), &["add", "-A"]);
    repo.rollback().await.unwrap();

    assert_eq!(
        std::fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "readme\n"
    );
    assert!(!repo.has_uncommitted_changes().await.unwrap());
}

#[tokio::test]
async fn test_fetch_prunes_deleted_remote_branch() {
    let temp = temp_dir();
    let (origin, work) = clone_with_remote_branch(temp.path());
    git(&origin, &["branch", "-D", "feature"]);
    let repo = GitRepository::open(&work, "origin", None).unwrap();

    repo.fetch().await.unwrap();

    assert_eq!(repo.list_branches().await.unwrap(), [Branch::local("main")]);
}
