// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! A git work tree opened for a run.
//!
//! ```text
//! GitRepository::open(path, remote, timeout)
//!   which git        --> ProcessError::ExecutableNotFound (fatal)
//!   gix discover     --> GitError::RepoNotFound / bare (fatal)
//!        |
//!        v
//!   current_head()   gix head_name, else rev-parse HEAD
//!   list_branches()  for-each-ref refs/heads + refs/remotes/<remote>
//!   checkout()       local:  checkout -q <name> --
//!                    remote: checkout -q -b <name> --track <remote>/<name>
//!                    detach: checkout -q --detach <start point>
//!   stage_all / commit / push / fetch / rollback
//! ```

use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::backend::{CheckoutMode, GitQuery, GixBackend, ShellBackend, VersionControl};
use super::branches::{Branch, BranchName, BranchOrigin, HeadRef, merge_branches};
use crate::error::{GitError, GixError, RetargetError, RetargetResult};

/// A discovered, non-bare git work tree plus the remote to work against.
#[derive(Debug, Clone)]
pub struct GitRepository {
    workdir: PathBuf,
    remote: String,
    shell: ShellBackend,
}

impl GitRepository {
    /// Opens the work tree containing `path`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `ProcessError::ExecutableNotFound` if git is not on PATH.
    /// - `GitError::RepoNotFound` if `path` is not inside a work tree.
    /// - `GitError::Gix(BareRepository)` for a bare repository.
    pub fn open(path: &Path, remote: &str, timeout: Option<Duration>) -> RetargetResult<Self> {
        if !path.is_dir() {
            return Err(GitError::RepoNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let workdir = GixBackend::workdir(path).map_err(|e| match e {
            RetargetError::Git(git) if matches!(*git, GitError::Gix(GixError::Discover(_))) => {
                GitError::RepoNotFound {
                    path: path.display().to_string(),
                }
                .into()
            }
            other => other,
        })?;

        let shell = ShellBackend::new(&workdir, timeout)?;
        debug!(workdir = %workdir.display(), remote, "opened repository");

        Ok(Self {
            workdir,
            remote: remote.to_string(),
            shell,
        })
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Reads HEAD; a detached HEAD is reported by commit id.
    ///
    /// # Errors
    ///
    /// Returns `GitError::NoCommits` when HEAD is detached and cannot be
    /// resolved, or any gix/git error.
    pub async fn current_head(&self) -> RetargetResult<HeadRef> {
        if let Some(branch) = GixBackend::current_branch(&self.workdir)? {
            return Ok(HeadRef::Branch(BranchName::new(branch)));
        }
        let sha = self
            .shell
            .git(&["rev-parse", "--verify", "-q", "HEAD"])
            .await
            .map_err(|_| GitError::NoCommits {
                path: self.workdir.display().to_string(),
            })?;
        Ok(HeadRef::Detached(sha))
    }

    /// Dirty check via gix.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the status cannot be computed.
    pub async fn has_uncommitted_changes(&self) -> RetargetResult<bool> {
        GixBackend::has_uncommitted_changes(&self.workdir)
    }

    /// `git fetch --prune <remote>`.
    ///
    /// # Errors
    ///
    /// Returns the git error; callers treat it as a warning.
    pub async fn fetch(&self) -> RetargetResult<()> {
        self.shell
            .git(&["fetch", "-q", "--prune", &self.remote])
            .await?;
        Ok(())
    }

    /// Enumerates local and remote-only branches.
    ///
    /// # Errors
    ///
    /// Returns the git error if either listing fails; no partial list is
    /// ever returned.
    pub async fn list_branches(&self) -> RetargetResult<Vec<Branch>> {
        let local = self
            .shell
            .git(&["for-each-ref", "--format=%(refname)", "refs/heads"])
            .await?;
        let remote_namespace = format!("refs/remotes/{}", self.remote);
        let remote = self
            .shell
            .git(&["for-each-ref", "--format=%(refname)", &remote_namespace])
            .await?;
        Ok(merge_branches(&local, &remote, &self.remote))
    }

    /// Switches the work tree to `branch`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::CheckoutFailed` with git's message.
    pub async fn checkout(&self, branch: &Branch, mode: CheckoutMode) -> RetargetResult<()> {
        let name = branch.name().as_str();
        let start_point = branch.start_point();
        let args: Vec<&str> = match (branch.origin(), mode) {
            (BranchOrigin::Local, _) => vec!["checkout", "-q", name, "--"],
            (BranchOrigin::Remote(_), CheckoutMode::Materialize) => {
                vec!["checkout", "-q", "-b", name, "--track", &start_point]
            }
            (BranchOrigin::Remote(_), CheckoutMode::Detached) => {
                vec!["checkout", "-q", "--detach", &start_point]
            }
        };
        self.run_checkout(name, &args).await
    }

    /// Returns to the checkout recorded before the run.
    ///
    /// # Errors
    ///
    /// Returns `GitError::CheckoutFailed` with git's message.
    pub async fn restore(&self, head: &HeadRef) -> RetargetResult<()> {
        match head {
            HeadRef::Branch(name) => {
                self.run_checkout(name.as_str(), &["checkout", "-q", name.as_str(), "--"])
                    .await
            }
            HeadRef::Detached(sha) => {
                self.run_checkout(sha, &["checkout", "-q", "--detach", sha])
                    .await
            }
        }
    }

    async fn run_checkout(&self, what: &str, args: &[&str]) -> RetargetResult<()> {
        self.shell.git(args).await.map_err(|e| -> RetargetError {
            GitError::CheckoutFailed {
                what: what.to_string(),
                message: git_message(e),
            }
            .into()
        })?;
        Ok(())
    }

    /// `git add -A`.
    ///
    /// # Errors
    ///
    /// Returns the git error.
    pub async fn stage_all(&self) -> RetargetResult<()> {
        self.shell.git(&["add", "-A"]).await?;
        Ok(())
    }

    /// Commits the staged changes.
    ///
    /// # Errors
    ///
    /// Returns `GitError::CommitFailed` with git's message.
    pub async fn commit(&self, branch: &BranchName, message: &str) -> RetargetResult<()> {
        self.shell
            .git(&["commit", "-q", "-m", message])
            .await
            .map_err(|e| -> RetargetError {
                GitError::CommitFailed {
                    branch: branch.to_string(),
                    message: git_message(e),
                }
                .into()
            })?;
        Ok(())
    }

    /// Pushes `branch` to the configured remote.
    ///
    /// # Errors
    ///
    /// Returns `GitError::PushFailed` with git's message.
    pub async fn push(&self, branch: &BranchName) -> RetargetResult<()> {
        self.shell
            .git(&["push", "-q", &self.remote, branch.as_str()])
            .await
            .map_err(|e| -> RetargetError {
                GitError::PushFailed {
                    branch: branch.to_string(),
                    remote: self.remote.clone(),
                    message: git_message(e),
                }
                .into()
            })?;
        Ok(())
    }

    /// `git reset -q --hard HEAD`.
    ///
    /// # Errors
    ///
    /// Returns the git error.
    pub async fn rollback(&self) -> RetargetResult<()> {
        self.shell.git(&["reset", "-q", "--hard", "HEAD"]).await?;
        Ok(())
    }
}

/// The useful part of a git failure: its stderr, or the process error.
fn git_message(err: RetargetError) -> String {
    match err {
        RetargetError::Git(git) => match *git {
            GitError::CommandFailed { message, .. } => message,
            other => other.to_string(),
        },
        other => other.to_string(),
    }
}

impl VersionControl for GitRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn remote(&self) -> &str {
        &self.remote
    }

    fn current_head(&self) -> BoxFuture<'_, RetargetResult<HeadRef>> {
        Box::pin(self.current_head())
    }

    fn has_uncommitted_changes(&self) -> BoxFuture<'_, RetargetResult<bool>> {
        Box::pin(self.has_uncommitted_changes())
    }

    fn fetch(&self) -> BoxFuture<'_, RetargetResult<()>> {
        Box::pin(self.fetch())
    }

    fn list_branches(&self) -> BoxFuture<'_, RetargetResult<Vec<Branch>>> {
        Box::pin(self.list_branches())
    }

    fn checkout<'a>(
        &'a self,
        branch: &'a Branch,
        mode: CheckoutMode,
    ) -> BoxFuture<'a, RetargetResult<()>> {
        Box::pin(self.checkout(branch, mode))
    }

    fn restore<'a>(&'a self, head: &'a HeadRef) -> BoxFuture<'a, RetargetResult<()>> {
        Box::pin(self.restore(head))
    }

    fn stage_all(&self) -> BoxFuture<'_, RetargetResult<()>> {
        Box::pin(self.stage_all())
    }

    fn commit<'a>(
        &'a self,
        branch: &'a BranchName,
        message: &'a str,
    ) -> BoxFuture<'a, RetargetResult<()>> {
        Box::pin(self.commit(branch, message))
    }

    fn push<'a>(&'a self, branch: &'a BranchName) -> BoxFuture<'a, RetargetResult<()>> {
        Box::pin(self.push(branch))
    }

    fn rollback(&self) -> BoxFuture<'_, RetargetResult<()>> {
        Box::pin(self.rollback())
    }
}
