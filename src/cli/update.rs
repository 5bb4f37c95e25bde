// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the repository commands.
//!
//! ```text
//! update <REPO>    every branch: retarget, commit, push
//! branches <REPO>  enumerated branches and their origin
//! scan <REPO>      preview edits on the current checkout only
//! ```
//!
//! Flags that mirror a config key are turned into overrides, so they win
//! over every file and environment layer.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `update` command.
#[derive(Debug, Clone, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct UpdateArgs {
    /// Repository path (any directory inside the work tree).
    #[arg(value_name = "REPO")]
    pub repo: PathBuf,

    /// Computes and reports every change without writing files or running
    /// mutating git commands.
    #[arg(short = 'p', long)]
    pub preview: bool,

    /// Commits locally but does not push.
    #[arg(long = "no-push")]
    pub no_push: bool,

    /// Fetches the remote (with --prune) before enumerating branches.
    #[arg(long)]
    pub fetch: bool,

    /// Runs even if the work tree has uncommitted changes.
    #[arg(long = "allow-dirty")]
    pub allow_dirty: bool,

    /// Remote used for enumeration, fetch and push.
    #[arg(short = 'r', long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Timeout for each git command, in seconds (0 = none).
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// `TargetFramework` value to write.
    #[arg(long = "target-framework", value_name = "VALUE")]
    pub target_framework: Option<String>,

    /// `LangVersion` value to write into primary project files.
    #[arg(long = "lang-version", value_name = "VALUE")]
    pub lang_version: Option<String>,

    /// Prints the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl UpdateArgs {
    /// Converts flags that mirror config keys to overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();

        if self.no_push {
            overrides.push("git/push=false".to_string());
        }
        if self.fetch {
            overrides.push("git/fetch=true".to_string());
        }
        if self.allow_dirty {
            overrides.push("git/allow_dirty=true".to_string());
        }
        if let Some(ref remote) = self.remote {
            overrides.push(format!("git/remote={remote}"));
        }
        if let Some(secs) = self.timeout {
            overrides.push(format!("git/timeout_secs={secs}"));
        }
        if let Some(ref value) = self.target_framework {
            overrides.push(format!("descriptor/target_framework={value}"));
        }
        if let Some(ref value) = self.lang_version {
            overrides.push(format!("descriptor/lang_version={value}"));
        }

        overrides
    }
}

/// Arguments for the `branches` command.
#[derive(Debug, Clone, Args)]
pub struct BranchesArgs {
    /// Repository path (any directory inside the work tree).
    #[arg(value_name = "REPO")]
    pub repo: PathBuf,

    /// Remote whose branches are listed.
    #[arg(short = 'r', long, value_name = "NAME")]
    pub remote: Option<String>,
}

impl BranchesArgs {
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        self.remote
            .iter()
            .map(|remote| format!("git/remote={remote}"))
            .collect()
    }
}

/// Arguments for the `scan` command.
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Repository path (any directory inside the work tree).
    #[arg(value_name = "REPO")]
    pub repo: PathBuf,

    /// Prints the report as JSON.
    #[arg(long)]
    pub json: bool,
}
