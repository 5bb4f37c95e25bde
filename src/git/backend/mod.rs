// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery (read)        --> GixBackend   (pure Rust gix, no subprocess)
//! git CLI (write)        --> ShellBackend (ProcessBuilder, timeout, no prompts)
//! VersionControl (async) --> GitRepository, or a fake in tests
//! ```

use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::branches::{Branch, BranchName, HeadRef};
use crate::core::process::builder::{ProcessBuilder, ProcessFlags};
use crate::error::{GitError, GixError, ProcessError, RetargetResult};

// --- Query Trait (Read-only operations) ---

/// Read-only git query operations.
pub trait GitQuery {
    /// Check if path is inside a git work tree.
    fn is_git_repo(path: &Path) -> bool;

    /// Resolve the top of the work tree containing `path`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if no repository is found or it is bare.
    fn workdir(path: &Path) -> RetargetResult<PathBuf>;

    /// Get current branch name (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    fn current_branch(path: &Path) -> RetargetResult<Option<String>>;

    /// Check for uncommitted changes (staged, unstaged, or untracked files).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or status check fails.
    fn has_uncommitted_changes(path: &Path) -> RetargetResult<bool>;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
pub struct GixBackend;

fn discover(path: &Path) -> Result<gix::Repository, GitError> {
    gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))
}

impl GitQuery for GixBackend {
    fn is_git_repo(path: &Path) -> bool {
        gix::discover(path).is_ok_and(|repo| repo.workdir().is_some())
    }

    fn workdir(path: &Path) -> RetargetResult<PathBuf> {
        let repo = discover(path)?;
        let workdir = repo
            .workdir()
            .ok_or(GitError::Gix(GixError::BareRepository))?;
        Ok(workdir.to_path_buf())
    }

    fn current_branch(path: &Path) -> RetargetResult<Option<String>> {
        let repo = discover(path)?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn has_uncommitted_changes(path: &Path) -> RetargetResult<bool> {
        use gix::status::UntrackedFiles;

        let repo = discover(path)?;

        let has_changes = repo
            .status(gix::progress::Discard)
            .map_err(|_| GitError::CommandFailed {
                command: "status".to_string(),
                message: "failed to prepare status check".to_string(),
            })?
            .untracked_files(UntrackedFiles::Files)
            .into_iter(None)
            .map_err(|_| GitError::CommandFailed {
                command: "status".to_string(),
                message: "failed to check repository status".to_string(),
            })?
            .next()
            .is_some();

        Ok(has_changes)
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Git CLI runner bound to one work tree.
///
/// Every call sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`, so a
/// missing credential fails the command instead of blocking on a prompt.
#[derive(Debug, Clone)]
pub struct ShellBackend {
    git: PathBuf,
    cwd: PathBuf,
    timeout: Option<Duration>,
}

impl ShellBackend {
    /// Resolves `git` on PATH.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::ExecutableNotFound` if git is not installed.
    pub fn new(cwd: &Path, timeout: Option<Duration>) -> Result<Self, ProcessError> {
        let git = ProcessBuilder::which("git")?.program().clone();
        Ok(Self {
            git,
            cwd: cwd.to_path_buf(),
            timeout,
        })
    }

    fn command(&self, args: &[&str]) -> ProcessBuilder {
        ProcessBuilder::new(&self.git)
            .name("git")
            .args(args)
            .cwd(&self.cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .timeout(self.timeout)
            .capture_output()
            .flag(ProcessFlags::ALLOW_FAILURE)
    }

    /// Runs git and returns its trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` if git cannot run or times out, and
    /// `GitError::CommandFailed` carrying git's stderr on a non-zero exit.
    pub async fn git(&self, args: &[&str]) -> RetargetResult<String> {
        let output = self.command(args).run().await?;
        if !output.success() {
            let message = if output.stderr().trim().is_empty() {
                output.stdout().trim()
            } else {
                output.stderr().trim()
            };
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: message.to_string(),
            }
            .into());
        }
        Ok(output.stdout().trim().to_string())
    }
}

// --- VersionControl Trait (workflow seam) ---

/// How a branch is checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    /// Switch to the branch, creating a tracking branch for remote-only ones.
    Materialize,
    /// Never create refs: remote-only branches are checked out detached.
    Detached,
}

/// Version-control operations the branch workflow needs.
///
/// Methods return `BoxFuture` so the trait stays object-safe and a fake can
/// stand in for git in tests.
pub trait VersionControl: Send + Sync {
    /// Top of the work tree.
    fn workdir(&self) -> &Path;

    /// Remote used for enumeration, fetch and push.
    fn remote(&self) -> &str;

    fn current_head(&self) -> BoxFuture<'_, RetargetResult<HeadRef>>;

    fn has_uncommitted_changes(&self) -> BoxFuture<'_, RetargetResult<bool>>;

    fn fetch(&self) -> BoxFuture<'_, RetargetResult<()>>;

    /// Local branches plus remote-only branches, deduplicated.
    fn list_branches(&self) -> BoxFuture<'_, RetargetResult<Vec<Branch>>>;

    fn checkout<'a>(
        &'a self,
        branch: &'a Branch,
        mode: CheckoutMode,
    ) -> BoxFuture<'a, RetargetResult<()>>;

    /// Returns to the checkout recorded before the run.
    fn restore<'a>(&'a self, head: &'a HeadRef) -> BoxFuture<'a, RetargetResult<()>>;

    /// Stages every change in the work tree.
    fn stage_all(&self) -> BoxFuture<'_, RetargetResult<()>>;

    fn commit<'a>(
        &'a self,
        branch: &'a BranchName,
        message: &'a str,
    ) -> BoxFuture<'a, RetargetResult<()>>;

    fn push<'a>(&'a self, branch: &'a BranchName) -> BoxFuture<'a, RetargetResult<()>>;

    /// Discards staged and unstaged changes to tracked files.
    fn rollback(&self) -> BoxFuture<'_, RetargetResult<()>>;
}

#[cfg(test)]
mod tests;
