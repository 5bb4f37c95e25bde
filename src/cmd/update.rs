// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Update command implementation for retarget-rs.

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::cli::update::UpdateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::git::repository::GitRepository;
use crate::workflow::branch::RetargetStep;
use crate::workflow::summary::RunSummary;
use crate::workflow::{Orchestrator, RunOptions};

/// Main handler for update command.
///
/// Branch failures are part of the summary; only fatal conditions return an
/// error.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened, git is missing, the
/// work tree is dirty, or branch enumeration fails.
pub async fn run_update_command(
    args: &UpdateArgs,
    config: &Config,
    cancel_token: CancellationToken,
) -> Result<RunSummary> {
    let repo = GitRepository::open(&args.repo, &config.git.remote, config.git.timeout())
        .with_context(|| format!("Failed to open repository {}", args.repo.display()))?;

    let options = RunOptions::from_config(config).with_preview(args.preview);
    let step = RetargetStep::new(&repo, config, options);
    let summary = Orchestrator::new(&repo, &step, options)
        .with_cancel_token(cancel_token)
        .run()
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(summary)
}
