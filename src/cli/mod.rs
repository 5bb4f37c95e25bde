// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for retarget-rs using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! retarget [global options] <command>
//! update <REPO> [--preview] [--no-push] [--fetch] ...
//! branches <REPO>
//! scan <REPO>
//! options
//! inis
//! version
//! ```

pub mod global;
pub mod update;


use crate::cli::global::GlobalOptions;
use crate::cli::update::{BranchesArgs, ScanArgs, UpdateArgs};
use clap::{Parser, Subcommand};

/// Multi-branch project retargeting tool
///
/// Updates the MSBuild project files on every branch of a git repository.
#[derive(Debug, Parser)]
#[command(
    name = "retarget",
    author,
    version,
    about = "Retarget MSBuild project files across every branch of a git repository",
    long_about = "retarget-rs Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Checks out every local and remote branch in turn, sets\n\
                  TargetFramework (and LangVersion for C# projects) in each\n\
                  project file, adds an entry to .gitignore, then commits and\n\
                  pushes. Run `retarget update --preview <REPO>` first to see\n\
                  what would change.",
    after_help = "CONFIGURATION:\n\n\
                  Settings are layered: built-in defaults, then `retarget.toml` in\n\
                  the current directory (unless --no-default-inis), then every\n\
                  --ini file in order, then RETARGET_* environment variables\n\
                  (e.g. RETARGET_GIT__REMOTE=upstream), then --set options, then\n\
                  command flags."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files used.
    Inis,

    /// Retargets every branch of a repository.
    Update(UpdateArgs),

    /// Lists the branches an update would visit.
    Branches(BranchesArgs),

    /// Previews project file changes on the current checkout.
    Scan(ScanArgs),
}

impl Command {
    /// Config overrides carried by command flags.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        match self {
            Self::Update(args) => args.to_config_overrides(),
            Self::Branches(args) => args.to_config_overrides(),
            Self::Version | Self::Options | Self::Inis | Self::Scan(_) => Vec::new(),
        }
    }
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
