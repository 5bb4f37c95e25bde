// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use futures_util::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::branch::{BranchState, RetargetStep, file_level_reason};
use super::commit::{ChangeSet, commit_message};
use super::summary::{BranchOutcome, FailedBranch, PushStatus, RunSummary};
use super::{BranchStep, Orchestrator, RunOptions};
use crate::config::Config;
use crate::config::types::{DescriptorConfig, IgnoreConfig};
use crate::error::{DescriptorError, FsError, GitError, RetargetError, RetargetResult};
use crate::git::backend::{CheckoutMode, VersionControl};
use crate::git::branches::{Branch, BranchName, HeadRef};

const APP_CSPROJ: &str = "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <OutputType>Exe</OutputType>\n  </PropertyGroup>\n</Project>\n";
const DONE_CSPROJ: &str = "<Project>\n  <PropertyGroup>\n    <TargetFramework>net8.0</TargetFramework>\n    <LangVersion>12</LangVersion>\n  </PropertyGroup>\n</Project>\n";

fn fail(what: &str) -> crate::error::RetargetError {
    GitError::CommandFailed {
        command: format!("git {what}"),
        message: "boom".to_string(),
    }
    .into()
}

/// In-memory stand-in for git. `checkout` replaces the work tree with the
/// files registered for the branch.
#[derive(Default)]
struct FakeVcs {
    root: PathBuf,
    branches: Vec<Branch>,
    trees: HashMap<String, Vec<(&'static str, &'static str)>>,
    dirty: bool,
    fail_list: bool,
    fail_fetch: bool,
    fail_restore: bool,
    fail_checkout: HashSet<String>,
    fail_commit: HashSet<String>,
    fail_push: bool,
    log: Mutex<Vec<String>>,
}

impl FakeVcs {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    fn branch(mut self, name: &str, files: &[(&'static str, &'static str)]) -> Self {
        self.branches.push(Branch::local(name));
        self.trees.insert(name.to_string(), files.to_vec());
        self
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn materialize(&self, name: &str) {
        for entry in std::fs::read_dir(&self.root).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                std::fs::remove_dir_all(path).unwrap();
            } else {
                std::fs::remove_file(path).unwrap();
            }
        }
        for (rel, content) in self.trees.get(name).into_iter().flatten() {
            let path = self.root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }
}

impl VersionControl for FakeVcs {
    fn workdir(&self) -> &Path {
        &self.root
    }

    fn remote(&self) -> &str {
        "origin"
    }

    fn current_head(&self) -> BoxFuture<'_, RetargetResult<HeadRef>> {
        Box::pin(async { Ok(HeadRef::Branch(BranchName::new("main"))) })
    }

    fn has_uncommitted_changes(&self) -> BoxFuture<'_, RetargetResult<bool>> {
        Box::pin(async { Ok(self.dirty) })
    }

    fn fetch(&self) -> BoxFuture<'_, RetargetResult<()>> {
        Box::pin(async {
            self.record("fetch".to_string());
            if self.fail_fetch { Err(fail("fetch")) } else { Ok(()) }
        })
    }

    fn list_branches(&self) -> BoxFuture<'_, RetargetResult<Vec<Branch>>> {
        Box::pin(async {
            if self.fail_list {
                return Err(fail("for-each-ref"));
            }
            Ok(self.branches.clone())
        })
    }

    fn checkout<'a>(
        &'a self,
        branch: &'a Branch,
        mode: CheckoutMode,
    ) -> BoxFuture<'a, RetargetResult<()>> {
        Box::pin(async move {
            self.record(format!("checkout {} {mode:?}", branch.name()));
            if self.fail_checkout.contains(branch.name().as_str()) {
                return Err(GitError::CheckoutFailed {
                    what: branch.name().to_string(),
                    message: "boom".to_string(),
                }
                .into());
            }
            self.materialize(branch.name().as_str());
            Ok(())
        })
    }

    fn restore<'a>(&'a self, head: &'a HeadRef) -> BoxFuture<'a, RetargetResult<()>> {
        Box::pin(async move {
            self.record(format!("restore {head}"));
            if self.fail_restore { Err(fail("checkout")) } else { Ok(()) }
        })
    }

    fn stage_all(&self) -> BoxFuture<'_, RetargetResult<()>> {
        Box::pin(async {
            self.record("stage".to_string());
            Ok(())
        })
    }

    fn commit<'a>(
        &'a self,
        branch: &'a BranchName,
        message: &'a str,
    ) -> BoxFuture<'a, RetargetResult<()>> {
        Box::pin(async move {
            self.record(format!("commit {branch}: {message}"));
            if self.fail_commit.contains(branch.as_str()) {
                return Err(GitError::CommitFailed {
                    branch: branch.to_string(),
                    message: "boom".to_string(),
                }
                .into());
            }
            Ok(())
        })
    }

    fn push<'a>(&'a self, branch: &'a BranchName) -> BoxFuture<'a, RetargetResult<()>> {
        Box::pin(async move {
            self.record(format!("push {branch}"));
            if self.fail_push { Err(fail("push")) } else { Ok(()) }
        })
    }

    fn rollback(&self) -> BoxFuture<'_, RetargetResult<()>> {
        Box::pin(async {
            self.record("rollback".to_string());
            Ok(())
        })
    }
}

/// Step that fails the named branches and processes the rest.
struct ScriptedStep {
    fail: HashSet<&'static str>,
    cancel_after_first: Option<CancellationToken>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedStep {
    fn new(fail: &[&'static str]) -> Self {
        Self {
            fail: fail.iter().copied().collect(),
            cancel_after_first: None,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl BranchStep for ScriptedStep {
    fn run<'a>(&'a self, branch: &'a Branch) -> BoxFuture<'a, BranchOutcome> {
        Box::pin(async move {
            self.seen.lock().unwrap().push(branch.name().to_string());
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
            if self.fail.contains(branch.name().as_str()) {
                return BranchOutcome::Failed(FailedBranch {
                    branch: branch.name().clone(),
                    stage: BranchState::Checkout,
                    reason: "boom".to_string(),
                });
            }
            BranchOutcome::Processed {
                branch: branch.name().clone(),
                descriptors_changed: 1,
                ignore_changed: false,
                push: PushStatus::Pushed,
                malformed: Vec::new(),
            }
        })
    }
}

fn three_branches(root: &Path) -> FakeVcs {
    FakeVcs::new(root)
        .branch("main", &[])
        .branch("broken", &[])
        .branch("dev", &[])
}

fn names(list: &[BranchName]) -> Vec<&str> {
    list.iter().map(BranchName::as_str).collect()
}

// --- Orchestrator ---

#[tokio::test]
async fn test_branch_failure_does_not_stop_run() {
    let temp = tempfile::tempdir().unwrap();
    let vcs = three_branches(temp.path());
    let step = ScriptedStep::new(&["broken"]);

    let summary = Orchestrator::new(&vcs, &step, RunOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(names(&summary.processed), ["main", "dev"]);
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].branch.as_str(), "broken");
    assert_eq!(summary.descriptors_changed, 2);
    assert_eq!(summary.branch_count(), 3);
    assert_eq!(vcs.log(), ["restore main"]);
}

#[tokio::test]
async fn test_cancelled_before_start_processes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let vcs = three_branches(temp.path());
    let step = ScriptedStep::new(&[]);
    let token = CancellationToken::new();
    token.cancel();

    let summary = Orchestrator::new(&vcs, &step, RunOptions::default())
        .with_cancel_token(token)
        .run()
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.branch_count(), 0);
    assert!(step.seen.lock().unwrap().is_empty());
    assert_eq!(vcs.log(), ["restore main"]);
}

#[tokio::test]
async fn test_cancellation_is_observed_between_branches() {
    let temp = tempfile::tempdir().unwrap();
    let vcs = three_branches(temp.path());
    let token = CancellationToken::new();
    let mut step = ScriptedStep::new(&[]);
    step.cancel_after_first = Some(token.clone());

    let summary = Orchestrator::new(&vcs, &step, RunOptions::default())
        .with_cancel_token(token)
        .run()
        .await
        .unwrap();

    // The branch in flight completes; the next one never starts
    assert_eq!(names(&summary.processed), ["main"]);
    assert!(summary.interrupted);
    assert_eq!(*step.seen.lock().unwrap(), ["main"]);
}

#[tokio::test]
async fn test_dirty_tree_is_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = three_branches(temp.path());
    vcs.dirty = true;
    let step = ScriptedStep::new(&[]);

    let err = Orchestrator::new(&vcs, &step, RunOptions::default())
        .run()
        .await
        .unwrap_err();

    assert!(err.to_string().contains("uncommitted changes"));
    assert!(step.seen.lock().unwrap().is_empty());
    assert!(vcs.log().is_empty());
}

#[tokio::test]
async fn test_allow_dirty_skips_preflight() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = three_branches(temp.path());
    vcs.dirty = true;
    let step = ScriptedStep::new(&[]);
    let options = RunOptions {
        allow_dirty: true,
        ..RunOptions::default()
    };

    let summary = Orchestrator::new(&vcs, &step, options).run().await.unwrap();
    assert_eq!(summary.processed.len(), 3);
}

#[tokio::test]
async fn test_enumeration_failure_is_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = three_branches(temp.path());
    vcs.fail_list = true;
    let step = ScriptedStep::new(&[]);

    let err = Orchestrator::new(&vcs, &step, RunOptions::default())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to enumerate branches");
    assert!(err.root_cause().to_string().contains("git for-each-ref - boom"));
}

#[tokio::test]
async fn test_fetch_failure_is_a_warning() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = three_branches(temp.path());
    vcs.fail_fetch = true;
    let step = ScriptedStep::new(&[]);
    let options = RunOptions {
        fetch: true,
        ..RunOptions::default()
    };

    let summary = Orchestrator::new(&vcs, &step, options).run().await.unwrap();

    assert_eq!(summary.processed.len(), 3);
    assert_eq!(vcs.log(), ["fetch", "restore main"]);
}

#[tokio::test]
async fn test_restore_failure_is_recorded() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = three_branches(temp.path());
    vcs.fail_restore = true;
    let step = ScriptedStep::new(&[]);

    let summary = Orchestrator::new(&vcs, &step, RunOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.processed.len(), 3);
    insta::assert_snapshot!(summary.restore_error.unwrap(), @"git error: git command failed: git checkout - boom");
}

// --- RetargetStep ---

fn push_options() -> RunOptions {
    RunOptions {
        push: true,
        ..RunOptions::default()
    }
}

async fn run_real(vcs: &FakeVcs, options: RunOptions) -> RunSummary {
    let config = Config::default();
    let step = RetargetStep::new(vcs, &config, options);
    Orchestrator::new(vcs, &step, options).run().await.unwrap()
}

#[tokio::test]
async fn test_step_commits_changed_branch_and_skips_empty_one() {
    let temp = tempfile::tempdir().unwrap();
    let vcs = FakeVcs::new(temp.path())
        .branch("main", &[("App/App.csproj", APP_CSPROJ)])
        .branch("dev", &[("README.md", "docs")]);

    let summary = run_real(&vcs, push_options()).await;

    assert_eq!(names(&summary.processed), ["main"]);
    assert_eq!(names(&summary.skipped), ["dev"]);
    assert_eq!(summary.descriptors_changed, 1);
    insta::assert_debug_snapshot!(vcs.log(), @r#"
    [
        "checkout main Materialize",
        "stage",
        "commit main: Update 1 project file (TargetFramework=net8.0, LangVersion=12); Add .vs/ to .gitignore",
        "push main",
        "checkout dev Materialize",
        "restore main",
    ]
    "#);
}

#[tokio::test]
async fn test_step_skips_up_to_date_branch() {
    let temp = tempfile::tempdir().unwrap();
    let vcs = FakeVcs::new(temp.path()).branch(
        "main",
        &[("App.csproj", DONE_CSPROJ), (".gitignore", "bin/\n.vs/\n")],
    );

    let summary = run_real(&vcs, push_options()).await;

    assert_eq!(names(&summary.skipped), ["main"]);
    assert_eq!(summary.descriptors_changed, 0);
    assert!(!vcs.log().iter().any(|entry| entry.starts_with("commit")));
}

#[tokio::test]
async fn test_step_ignore_only_change_is_committed() {
    let temp = tempfile::tempdir().unwrap();
    let vcs = FakeVcs::new(temp.path()).branch("main", &[("App.csproj", DONE_CSPROJ)]);

    let summary = run_real(&vcs, RunOptions::default()).await;

    assert_eq!(names(&summary.processed), ["main"]);
    assert_eq!(summary.descriptors_changed, 0);
    assert!(vcs.log().contains(&"commit main: Add .vs/ to .gitignore".to_string()));
    assert!(!vcs.log().iter().any(|entry| entry.starts_with("push")));
}

#[tokio::test]
async fn test_step_malformed_file_does_not_block_others() {
    let temp = tempfile::tempdir().unwrap();
    let vcs = FakeVcs::new(temp.path()).branch(
        "main",
        &[
            ("A/A.csproj", "<Project><PropertyGroup></Project>"),
            ("B/B.fsproj", APP_CSPROJ),
        ],
    );

    let summary = run_real(&vcs, RunOptions::default()).await;

    assert_eq!(names(&summary.processed), ["main"]);
    assert_eq!(summary.descriptors_changed, 1);
    assert_eq!(summary.malformed.len(), 1);
    assert_eq!(summary.malformed[0].path, Path::new("A").join("A.csproj"));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("A/A.csproj")).unwrap(),
        "<Project><PropertyGroup></Project>"
    );
    assert!(vcs.log().contains(
        &"commit main: Update 1 project file (TargetFramework=net8.0); Add .vs/ to .gitignore"
            .to_string()
    ));
}

#[test]
fn test_write_failure_is_not_a_malformed_file() {
    let parse: RetargetError = DescriptorError::Malformed {
        position: 9,
        message: "unclosed element".to_string(),
    }
    .into();
    assert_eq!(
        file_level_reason(parse).unwrap(),
        "descriptor error: malformed project file at byte 9: unclosed element"
    );

    let write: RetargetError = FsError::IoError {
        path: "App/App.csproj".to_string(),
        source: std::io::Error::other("disk full"),
    }
    .into();
    assert!(matches!(file_level_reason(write), Err(RetargetError::Fs(_))));
}

#[tokio::test]
async fn test_step_checkout_failure() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = FakeVcs::new(temp.path())
        .branch("main", &[("App.csproj", APP_CSPROJ)])
        .branch("gone", &[]);
    vcs.fail_checkout.insert("gone".to_string());

    let summary = run_real(&vcs, RunOptions::default()).await;

    assert_eq!(names(&summary.processed), ["main"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].stage, BranchState::Checkout);
    insta::assert_snapshot!(summary.failed[0].reason, @"git error: failed to checkout gone: boom");
}

#[tokio::test]
async fn test_step_commit_failure_rolls_back() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = FakeVcs::new(temp.path())
        .branch("main", &[("App.csproj", APP_CSPROJ)])
        .branch("dev", &[("App.csproj", APP_CSPROJ)]);
    vcs.fail_commit.insert("main".to_string());

    let summary = run_real(&vcs, push_options()).await;

    assert_eq!(names(&summary.processed), ["dev"]);
    assert_eq!(summary.failed[0].branch.as_str(), "main");
    assert_eq!(summary.failed[0].stage, BranchState::Commit);
    assert_eq!(summary.descriptors_changed, 1);

    let log = vcs.log();
    let commit = log.iter().position(|e| e.starts_with("commit main")).unwrap();
    assert_eq!(log[commit + 1], "rollback");
    assert!(!log.contains(&"push main".to_string()));
}

#[tokio::test]
async fn test_step_push_failure_is_a_warning() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = FakeVcs::new(temp.path()).branch("main", &[("App.csproj", APP_CSPROJ)]);
    vcs.fail_push = true;

    let summary = run_real(&vcs, push_options()).await;

    assert_eq!(names(&summary.processed), ["main"]);
    assert_eq!(names(&summary.unpushed), ["main"]);
    assert!(summary.failed.is_empty());
}

#[tokio::test]
async fn test_step_push_failure_as_error() {
    let temp = tempfile::tempdir().unwrap();
    let mut vcs = FakeVcs::new(temp.path()).branch("main", &[("App.csproj", APP_CSPROJ)]);
    vcs.fail_push = true;
    let options = RunOptions {
        push_failure_is_error: true,
        ..push_options()
    };

    let summary = run_real(&vcs, options).await;

    assert!(summary.processed.is_empty());
    assert!(summary.unpushed.is_empty());
    assert_eq!(summary.failed[0].stage, BranchState::Commit);
}

#[tokio::test]
async fn test_step_preview_writes_and_commits_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let vcs = FakeVcs::new(temp.path()).branch("main", &[("App.csproj", APP_CSPROJ)]);

    let summary = run_real(&vcs, push_options().with_preview(true)).await;

    assert!(summary.preview);
    assert_eq!(names(&summary.processed), ["main"]);
    assert_eq!(summary.descriptors_changed, 1);
    assert_eq!(vcs.log(), ["checkout main Detached", "restore main"]);
    assert_eq!(
        std::fs::read_to_string(temp.path().join("App.csproj")).unwrap(),
        APP_CSPROJ
    );
    assert!(!temp.path().join(".gitignore").exists());
}

// --- Commit message and summary rendering ---

#[test]
fn test_commit_message() {
    let descriptor = DescriptorConfig::default();
    let ignore = IgnoreConfig::default();

    let both = ChangeSet {
        descriptors: 3,
        target_framework: true,
        lang_version: true,
        ignore_file: true,
    };
    insta::assert_snapshot!(
        commit_message(&both, &descriptor, &ignore),
        @"Update 3 project files (TargetFramework=net8.0, LangVersion=12); Add .vs/ to .gitignore"
    );

    let lang_only = ChangeSet {
        descriptors: 1,
        lang_version: true,
        ..ChangeSet::default()
    };
    insta::assert_snapshot!(
        commit_message(&lang_only, &descriptor, &ignore),
        @"Update 1 project file (LangVersion=12)"
    );

    assert!(ChangeSet::default().is_empty());
}

#[test]
fn test_summary_display() {
    let mut summary = RunSummary::new(false);
    let processed = |name: &str, push: PushStatus| BranchOutcome::Processed {
        branch: BranchName::new(name),
        descriptors_changed: 2,
        ignore_changed: true,
        push,
        malformed: Vec::new(),
    };
    summary.record(processed("main", PushStatus::Pushed));
    summary.record(BranchOutcome::Skipped {
        branch: BranchName::new("dev"),
        reason: "no project files".to_string(),
        malformed: Vec::new(),
    });
    summary.record(processed("feature", PushStatus::Failed("rejected".to_string())));
    summary.record(BranchOutcome::Failed(FailedBranch {
        branch: BranchName::new("broken"),
        stage: BranchState::Checkout,
        reason: "boom".to_string(),
    }));

    insta::assert_snapshot!(summary.to_string(), @r"
    Processed 2 (main, feature)
    Skipped   1 (dev)
    Failed    1
      broken [checkout]: boom
    Project files changed: 4
    Unpushed  1 (feature)
    ");
    assert!(summary.has_failures());
}

#[test]
fn test_summary_json() {
    let mut summary = RunSummary::new(true);
    summary.record(BranchOutcome::Skipped {
        branch: BranchName::new("dev"),
        reason: "no project files".to_string(),
        malformed: Vec::new(),
    });
    summary.interrupted = true;

    let json = serde_json::to_value(&summary).unwrap();
    insta::assert_snapshot!(json.to_string(), @r#"{"descriptors_changed":0,"failed":[],"interrupted":true,"malformed":[],"preview":true,"processed":[],"restore_error":null,"skipped":["dev"],"unpushed":[]}"#);
}

#[test]
fn test_branch_state_names() {
    assert_eq!(BranchState::MutateDescriptors.to_string(), "mutate_descriptors");
    assert!(BranchState::Skipped.is_terminal());
    assert!(!BranchState::Commit.is_terminal());
}
