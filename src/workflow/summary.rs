// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-branch outcomes and the run summary they fold into.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::branch::BranchState;
use crate::git::branches::BranchName;

/// Delivery status of a committed branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushStatus {
    Pushed,
    /// Push disabled, or preview mode.
    NotRequested,
    /// Push failed; the commit exists locally.
    Failed(String),
}

/// A descriptor that could not be parsed or read. Never counted as changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedFile {
    pub branch: BranchName,
    pub path: PathBuf,
    pub reason: String,
}

/// A branch that hit a branch-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBranch {
    pub branch: BranchName,
    pub stage: BranchState,
    pub reason: String,
}

/// Terminal result of one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    Processed {
        branch: BranchName,
        descriptors_changed: usize,
        ignore_changed: bool,
        push: PushStatus,
        malformed: Vec<MalformedFile>,
    },
    Skipped {
        branch: BranchName,
        reason: String,
        malformed: Vec<MalformedFile>,
    },
    Failed(FailedBranch),
}

impl BranchOutcome {
    #[must_use]
    pub const fn branch(&self) -> &BranchName {
        match self {
            Self::Processed { branch, .. } | Self::Skipped { branch, .. } => branch,
            Self::Failed(failed) => &failed.branch,
        }
    }

    #[must_use]
    pub const fn state(&self) -> BranchState {
        match self {
            Self::Processed { .. } => BranchState::Done,
            Self::Skipped { .. } => BranchState::Skipped,
            Self::Failed(_) => BranchState::Failed,
        }
    }
}

/// Aggregated result of a run.
///
/// `processed`, `skipped` and `failed` are disjoint; `unpushed` is a subset
/// of `processed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub preview: bool,
    pub processed: Vec<BranchName>,
    pub skipped: Vec<BranchName>,
    pub failed: Vec<FailedBranch>,
    pub unpushed: Vec<BranchName>,
    pub malformed: Vec<MalformedFile>,
    /// Descriptor files changed (or, in preview, that would change).
    pub descriptors_changed: usize,
    pub interrupted: bool,
    pub restore_error: Option<String>,
}

impl RunSummary {
    #[must_use]
    pub fn new(preview: bool) -> Self {
        Self {
            preview,
            ..Self::default()
        }
    }

    /// Folds one branch outcome into the summary.
    pub fn record(&mut self, outcome: BranchOutcome) {
        match outcome {
            BranchOutcome::Processed {
                branch,
                descriptors_changed,
                push,
                malformed,
                ..
            } => {
                self.descriptors_changed += descriptors_changed;
                if matches!(push, PushStatus::Failed(_)) {
                    self.unpushed.push(branch.clone());
                }
                self.malformed.extend(malformed);
                self.processed.push(branch);
            }
            BranchOutcome::Skipped {
                branch, malformed, ..
            } => {
                self.malformed.extend(malformed);
                self.skipped.push(branch);
            }
            BranchOutcome::Failed(failed) => self.failed.push(failed),
        }
    }

    /// Total number of branches that reached a terminal state.
    #[must_use]
    pub const fn branch_count(&self) -> usize {
        self.processed.len() + self.skipped.len() + self.failed.len()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, label: &str, names: &[BranchName]) -> fmt::Result {
    write!(f, "{label:<10}{}", names.len())?;
    if !names.is_empty() {
        let joined: Vec<&str> = names.iter().map(BranchName::as_str).collect();
        write!(f, " ({})", joined.join(", "))?;
    }
    writeln!(f)
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.preview {
            writeln!(f, "Preview: no files were written and nothing was committed")?;
        }
        write_names(f, "Processed", &self.processed)?;
        write_names(f, "Skipped", &self.skipped)?;
        writeln!(f, "{:<10}{}", "Failed", self.failed.len())?;
        for failed in &self.failed {
            writeln!(f, "  {} [{}]: {}", failed.branch, failed.stage, failed.reason)?;
        }
        writeln!(f, "Project files changed: {}", self.descriptors_changed)?;
        if !self.unpushed.is_empty() {
            write_names(f, "Unpushed", &self.unpushed)?;
        }
        if !self.malformed.is_empty() {
            writeln!(f, "Malformed project files: {}", self.malformed.len())?;
            for file in &self.malformed {
                writeln!(f, "  {}: {}", file.branch, file.path.display())?;
            }
        }
        if self.interrupted {
            writeln!(f, "Run interrupted; remaining branches were not processed")?;
        }
        if let Some(err) = &self.restore_error {
            writeln!(f, "Failed to restore original checkout: {err}")?;
        }
        Ok(())
    }
}
