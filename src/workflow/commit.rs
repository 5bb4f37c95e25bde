// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch committer.
//!
//! ```text
//! nothing changed ----------------------------> (caller skips)
//! preview ------------------------------------> log "would commit", NotRequested
//! stage_all --> commit --+-- err --> rollback --> CommitError
//!                        v
//!                  push enabled? --no--> NotRequested
//!                        |
//!                   push --+-- ok  --> Pushed
//!                          +-- err --> Failed(reason) (warning)
//! ```

use std::fmt;

use super::RunOptions;
use crate::config::types::{DescriptorConfig, IgnoreConfig};
use crate::git::backend::VersionControl;
use crate::git::branches::BranchName;
use crate::project::descriptor::Field;
use crate::project::ignore_file::IGNORE_FILE;

use super::summary::PushStatus;

/// What changed on one branch, as far as the commit message is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub descriptors: usize,
    pub target_framework: bool,
    pub lang_version: bool,
    pub ignore_file: bool,
}

impl ChangeSet {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.descriptors == 0 && !self.ignore_file
    }

    /// Marks `field` as written in at least one descriptor.
    pub const fn note_field(&mut self, field: Field) {
        match field {
            Field::TargetFramework => self.target_framework = true,
            Field::LangVersion => self.lang_version = true,
        }
    }
}

/// Builds the commit message listing exactly the changed categories.
///
/// ```text
/// Update 2 project files (TargetFramework=net8.0, LangVersion=12); Add .vs/ to .gitignore
/// ```
#[must_use]
pub fn commit_message(
    changes: &ChangeSet,
    descriptor: &DescriptorConfig,
    ignore: &IgnoreConfig,
) -> String {
    let mut clauses = Vec::with_capacity(2);

    if changes.descriptors > 0 {
        let noun = if changes.descriptors == 1 {
            "project file"
        } else {
            "project files"
        };
        let mut values = Vec::with_capacity(2);
        if changes.target_framework {
            values.push(format!(
                "{}={}",
                Field::TargetFramework,
                descriptor.target_framework.trim()
            ));
        }
        if changes.lang_version {
            values.push(format!(
                "{}={}",
                Field::LangVersion,
                descriptor.lang_version.trim()
            ));
        }
        clauses.push(format!(
            "Update {} {noun} ({})",
            changes.descriptors,
            values.join(", ")
        ));
    }

    if changes.ignore_file {
        clauses.push(format!("Add {} to {IGNORE_FILE}", ignore.entry.trim()));
    }

    clauses.join("; ")
}

/// A failed stage or commit. The work tree has been reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitError(pub String);

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stages, commits and optionally pushes `branch`.
///
/// # Errors
///
/// Returns a `CommitError` if staging or committing fails, and for a push
/// failure when `push_failure_is_error` is set.
pub async fn commit_branch(
    vcs: &dyn VersionControl,
    branch: &BranchName,
    message: &str,
    options: &RunOptions,
) -> Result<PushStatus, CommitError> {
    if options.preview {
        tracing::info!(branch = %branch, message, "Would commit");
        return Ok(PushStatus::NotRequested);
    }

    let committed = match vcs.stage_all().await {
        Ok(()) => vcs.commit(branch, message).await,
        Err(e) => Err(e),
    };
    if let Err(e) = committed {
        if let Err(reset) = vcs.rollback().await {
            tracing::error!(branch = %branch, error = %reset, "Failed to reset work tree");
        }
        return Err(CommitError(e.to_string()));
    }
    tracing::info!(branch = %branch, message, "Committed");

    if !options.push {
        return Ok(PushStatus::NotRequested);
    }

    match vcs.push(branch).await {
        Ok(()) => {
            tracing::info!(branch = %branch, remote = vcs.remote(), "Pushed");
            Ok(PushStatus::Pushed)
        }
        Err(e) if options.push_failure_is_error => Err(CommitError(e.to_string())),
        Err(e) => {
            tracing::warn!(branch = %branch, error = %e, "Push failed; commit kept locally");
            Ok(PushStatus::Failed(e.to_string()))
        }
    }
}
