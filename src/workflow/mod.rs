// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Batch branch workflow.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator::run()
//!   preflight     dirty work tree? --> fatal (unless allow_dirty)
//!   record HEAD   HeadRef::Branch | HeadRef::Detached
//!   fetch         optional, failure is a warning
//!   enumerate     VersionControl::list_branches()  --> fatal on error
//!      |
//!      v
//!   for each branch (strictly one at a time):
//!      cancelled? --> stop, interrupted = true
//!      BranchStep::run(branch) --> BranchOutcome --> RunSummary::record()
//!      |
//!      v
//!   restore HEAD  failure is logged and kept in the summary
//! ```
//!
//! # Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Orchestrator`] | Drives the run and folds outcomes |
//! | [`BranchStep`] | One branch from `Start` to a terminal state |
//! | [`RetargetStep`](branch::RetargetStep) | The real step over a `VersionControl` |
//! | [`RunSummary`](summary::RunSummary) | Processed / skipped / failed branches |
//!
//! Branches never share state, so one branch failing only adds an entry to
//! the summary.

pub mod branch;
pub mod commit;
pub mod summary;

use anyhow::Context;
use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{GitError, Result, RetargetError};
use crate::git::backend::VersionControl;
use crate::git::branches::Branch;

use summary::{BranchOutcome, RunSummary};

/// Switches that shape one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunOptions {
    /// Compute and report, but write no file and run no mutating git command.
    pub preview: bool,
    pub push: bool,
    pub push_failure_is_error: bool,
    pub fetch: bool,
    pub allow_dirty: bool,
}

impl RunOptions {
    /// Options from the `[git]` section.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            preview: false,
            push: config.git.push,
            push_failure_is_error: config.git.push_failure_is_error,
            fetch: config.git.fetch,
            allow_dirty: config.git.allow_dirty,
        }
    }

    #[must_use]
    pub const fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }
}

/// Processes one branch.
///
/// Implementations never return an error: every failure becomes a
/// [`BranchOutcome::Failed`].
pub trait BranchStep: Send + Sync {
    fn run<'a>(&'a self, branch: &'a Branch) -> BoxFuture<'a, BranchOutcome>;
}

/// Runs a [`BranchStep`] over every enumerated branch.
pub struct Orchestrator<'a> {
    vcs: &'a dyn VersionControl,
    step: &'a dyn BranchStep,
    options: RunOptions,
    cancel_token: CancellationToken,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(vcs: &'a dyn VersionControl, step: &'a dyn BranchStep, options: RunOptions) -> Self {
        Self {
            vcs,
            step,
            options,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop between branches.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Runs the whole workflow and returns the summary.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions: a dirty work tree, no
    /// commit to return to, or a failing branch enumeration. Branch-level
    /// failures are recorded in the summary instead.
    pub async fn run(&self) -> Result<RunSummary> {
        let workdir = self.vcs.workdir().display().to_string();

        if !self.options.allow_dirty
            && self
                .vcs
                .has_uncommitted_changes()
                .await
                .context("Failed to check work tree status")?
        {
            return Err(RetargetError::from(GitError::UncommittedChanges { path: workdir }).into());
        }

        let original = self
            .vcs
            .current_head()
            .await
            .context("Failed to resolve current checkout")?;
        tracing::info!(head = %original, "Recorded original checkout");

        if self.options.fetch
            && let Err(e) = self.vcs.fetch().await
        {
            tracing::warn!(remote = self.vcs.remote(), error = %e, "Fetch failed; using existing refs");
        }

        let branches = self
            .vcs
            .list_branches()
            .await
            .context("Failed to enumerate branches")?;
        tracing::info!(count = branches.len(), preview = self.options.preview, "Starting run");

        let mut summary = RunSummary::new(self.options.preview);
        for (i, branch) in branches.iter().enumerate() {
            if self.cancel_token.is_cancelled() {
                tracing::warn!(remaining = branches.len() - i, "Run interrupted");
                summary.interrupted = true;
                break;
            }

            tracing::info!(branch = %branch, index = i + 1, total = branches.len(), "Processing branch");
            let outcome = self.step.run(branch).await;
            tracing::info!(branch = %outcome.branch(), state = %outcome.state(), "Branch finished");
            summary.record(outcome);
        }

        if let Err(e) = self.vcs.restore(&original).await {
            tracing::error!(head = %original, error = %e, "Failed to restore original checkout");
            summary.restore_error = Some(e.to_string());
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests;
