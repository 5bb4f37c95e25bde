// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branches command implementation for retarget-rs.

use anyhow::Context;

use crate::cli::update::BranchesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::git::branches::{BranchOrigin, HeadRef};
use crate::git::repository::GitRepository;

/// Main handler for branches command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or enumeration fails.
pub async fn run_branches_command(args: &BranchesArgs, config: &Config) -> Result<()> {
    let repo = GitRepository::open(&args.repo, &config.git.remote, config.git.timeout())
        .with_context(|| format!("Failed to open repository {}", args.repo.display()))?;

    let head = repo.current_head().await.ok();
    let branches = repo
        .list_branches()
        .await
        .context("Failed to enumerate branches")?;

    if branches.is_empty() {
        println!("No branches found");
        return Ok(());
    }

    for branch in &branches {
        let marker = match &head {
            Some(HeadRef::Branch(name)) if name == branch.name() => '*',
            _ => ' ',
        };
        let origin = match branch.origin() {
            BranchOrigin::Local => "local".to_string(),
            BranchOrigin::Remote(remote) => format!("remote {remote}"),
        };
        println!("{marker} {:40} {origin}", branch.name().as_str());
    }
    Ok(())
}
