// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-branch state machine.
//!
//! ```text
//! Start --> Checkout --> Locate --> MutateDescriptors --> MutateIgnore --> Commit --> Done
//!              |           |  \              |                |              |
//!              v           v   `-- no files   v                v              +-- nothing changed --> Skipped
//!            Failed      Failed    Skipped  Failed           Failed           `-- commit error    --> Failed
//! ```
//!
//! A descriptor that cannot be read or parsed is a file-level problem: it is
//! reported as malformed and the branch continues with the remaining files.
//! Failing to write an edited descriptor fails the branch.

use futures_util::future::BoxFuture;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::commit::{ChangeSet, commit_branch, commit_message};
use super::summary::{BranchOutcome, FailedBranch, MalformedFile};
use super::{BranchStep, RunOptions};
use crate::config::Config;
use crate::error::{RetargetError, RetargetResult};
use crate::git::backend::{CheckoutMode, VersionControl};
use crate::git::branches::Branch;
use crate::project::descriptor::{DescriptorKind, FieldAction, update_descriptor};
use crate::project::ignore_file::ensure_ignore_entry;
use crate::project::locate::locate_descriptors;

/// States a branch passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchState {
    Start,
    Checkout,
    Locate,
    MutateDescriptors,
    MutateIgnore,
    Commit,
    Done,
    Skipped,
    Failed,
}

impl BranchState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Checkout => "checkout",
            Self::Locate => "locate",
            Self::MutateDescriptors => "mutate_descriptors",
            Self::MutateIgnore => "mutate_ignore",
            Self::Commit => "commit",
            Self::Done => "done",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Skipped | Self::Failed)
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The real branch step: check out, edit the tree, commit.
pub struct RetargetStep<'a> {
    vcs: &'a dyn VersionControl,
    config: &'a Config,
    options: RunOptions,
}

impl<'a> RetargetStep<'a> {
    #[must_use]
    pub const fn new(vcs: &'a dyn VersionControl, config: &'a Config, options: RunOptions) -> Self {
        Self {
            vcs,
            config,
            options,
        }
    }

    /// Runs `branch` from `Start` to a terminal state.
    pub async fn process(&self, branch: &Branch) -> BranchOutcome {
        let name = branch.name();
        let enter = |state: BranchState| {
            tracing::debug!(branch = %name, state = %state, "Entering state");
            state
        };
        let fail = |stage: BranchState, reason: String| {
            tracing::error!(branch = %name, state = %stage, error = %reason, "Branch failed");
            BranchOutcome::Failed(FailedBranch {
                branch: name.clone(),
                stage,
                reason,
            })
        };

        enter(BranchState::Start);

        let state = enter(BranchState::Checkout);
        let mode = if self.options.preview {
            CheckoutMode::Detached
        } else {
            CheckoutMode::Materialize
        };
        if let Err(e) = self.vcs.checkout(branch, mode).await {
            return fail(state, e.to_string());
        }

        let state = enter(BranchState::Locate);
        let root = self.vcs.workdir();
        let files = match locate_descriptors(root, &self.config.descriptor, &self.config.scan) {
            Ok(files) => files,
            Err(e) => return fail(state, e.to_string()),
        };
        if files.is_empty() {
            tracing::info!(branch = %name, "No project files; skipping");
            return BranchOutcome::Skipped {
                branch: name.clone(),
                reason: "no project files".to_string(),
                malformed: Vec::new(),
            };
        }
        tracing::debug!(branch = %name, count = files.len(), "Located project files");

        let state = enter(BranchState::MutateDescriptors);
        let mut changes = ChangeSet::default();
        let mut malformed = Vec::new();
        for path in &files {
            if let Err(e) = self.mutate_descriptor(branch, root, path, &mut changes, &mut malformed)
            {
                self.discard_edits(branch, &changes).await;
                return fail(state, e.to_string());
            }
        }

        let state = enter(BranchState::MutateIgnore);
        match ensure_ignore_entry(root, &self.config.ignore, self.options.preview) {
            Ok(changed) => changes.ignore_file = changed,
            Err(e) => {
                self.discard_edits(branch, &changes).await;
                return fail(state, e.to_string());
            }
        }

        let state = enter(BranchState::Commit);
        if changes.is_empty() {
            tracing::info!(branch = %name, "Already up to date");
            return BranchOutcome::Skipped {
                branch: name.clone(),
                reason: "already up to date".to_string(),
                malformed,
            };
        }

        let message = commit_message(&changes, &self.config.descriptor, &self.config.ignore);
        match commit_branch(self.vcs, name, &message, &self.options).await {
            Ok(push) => {
                enter(BranchState::Done);
                BranchOutcome::Processed {
                    branch: name.clone(),
                    descriptors_changed: changes.descriptors,
                    ignore_changed: changes.ignore_file,
                    push,
                    malformed,
                }
            }
            Err(e) => fail(state, e.to_string()),
        }
    }

    fn mutate_descriptor(
        &self,
        branch: &Branch,
        root: &Path,
        path: &Path,
        changes: &mut ChangeSet,
        malformed: &mut Vec<MalformedFile>,
    ) -> RetargetResult<()> {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let kind = DescriptorKind::of(path, &self.config.descriptor.primary_extension);

        match update_descriptor(path, kind, &self.config.descriptor, self.options.preview) {
            Ok(update) => {
                for change in &update.changes {
                    tracing::debug!(
                        branch = %branch.name(),
                        file = %relative.display(),
                        "{change}"
                    );
                    if change.action != FieldAction::Unchanged {
                        changes.note_field(change.field);
                    }
                }
                if update.is_modified() {
                    changes.descriptors += 1;
                    tracing::info!(
                        branch = %branch.name(),
                        file = %relative.display(),
                        "Updated project file"
                    );
                }
            }
            Err(e) => {
                let reason = file_level_reason(e)?;
                tracing::warn!(
                    branch = %branch.name(),
                    file = %relative.display(),
                    error = %reason,
                    "Skipping project file"
                );
                malformed.push(MalformedFile {
                    branch: branch.name().clone(),
                    path: relative.to_path_buf(),
                    reason,
                });
            }
        }
        Ok(())
    }

    async fn discard_edits(&self, branch: &Branch, changes: &ChangeSet) {
        if self.options.preview || changes.is_empty() {
            return;
        }
        if let Err(e) = self.vcs.rollback().await {
            tracing::error!(branch = %branch.name(), error = %e, "Failed to reset work tree");
        }
    }
}

/// Reason to record for a descriptor that is skipped, or the error back if it
/// must fail the branch instead.
pub(super) fn file_level_reason(err: RetargetError) -> RetargetResult<String> {
    match err {
        RetargetError::Descriptor(_) => Ok(err.to_string()),
        other => Err(other),
    }
}

impl BranchStep for RetargetStep<'_> {
    fn run<'a>(&'a self, branch: &'a Branch) -> BoxFuture<'a, BranchOutcome> {
        Box::pin(self.process(branch))
    }
}
