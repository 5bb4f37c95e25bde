// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for CLI parsing.
//!
//! Tests the CLI module with realistic command-line argument patterns.

use clap::Parser;
use retarget_rs::cli::global::GlobalOptions;
use retarget_rs::cli::{Cli, Command};
use std::path::PathBuf;

// =============================================================================
// Informational Commands
// =============================================================================

#[test]
fn cli_version_command() {
    let cli = Cli::try_parse_from(["retarget", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn cli_options_and_inis() {
    let cli = Cli::try_parse_from(["retarget", "--no-default-inis", "options"]).unwrap();
    assert!(cli.global.no_default_inis);
    assert!(matches!(cli.command, Some(Command::Options)));

    let cli = Cli::try_parse_from(["retarget", "inis"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Inis)));
}

// =============================================================================
// Update Command
// =============================================================================

#[test]
fn cli_update_defaults() {
    let cli = Cli::try_parse_from(["retarget", "update", "."]).unwrap();
    let Some(Command::Update(args)) = cli.command else {
        panic!("expected update command");
    };
    assert_eq!(args.repo, PathBuf::from("."));
    assert!(!args.preview);
    assert!(!args.no_push);
    assert!(args.remote.is_none());
    assert!(args.to_config_overrides().is_empty());
}

#[test]
fn cli_update_short_flags() {
    let cli = Cli::try_parse_from([
        "retarget", "update", "-p", "-r", "fork", "-t", "10", "--json", "repo",
    ])
    .unwrap();
    let Some(Command::Update(args)) = cli.command else {
        panic!("expected update command");
    };
    assert!(args.preview);
    assert!(args.json);
    insta::assert_debug_snapshot!(args.to_config_overrides(), @r#"
    [
        "git/remote=fork",
        "git/timeout_secs=10",
    ]
    "#);
}

#[test]
fn cli_update_allow_dirty() {
    let cli = Cli::try_parse_from(["retarget", "update", "--allow-dirty", "repo"]).unwrap();
    let overrides = cli.command.unwrap().to_config_overrides();
    assert_eq!(overrides, ["git/allow_dirty=true"]);
}

#[test]
fn cli_update_rejects_non_numeric_timeout() {
    let result = Cli::try_parse_from(["retarget", "update", "--timeout", "soon", "repo"]);
    assert!(result.is_err());
}

// =============================================================================
// Scan and Branches
// =============================================================================

#[test]
fn cli_scan_json() {
    let cli = Cli::try_parse_from(["retarget", "scan", "--json", "/src/app"]).unwrap();
    let Some(Command::Scan(args)) = cli.command else {
        panic!("expected scan command");
    };
    assert!(args.json);
    assert_eq!(args.repo, PathBuf::from("/src/app"));
}

#[test]
fn cli_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["retarget", "build"]).is_err());
}

// =============================================================================
// Global Options
// =============================================================================

#[test]
fn cli_global_options_after_subcommand_are_rejected() {
    // Global options are not marked `global = true`, so they go first
    assert!(Cli::try_parse_from(["retarget", "options", "-l", "4"]).is_err());
}

#[test]
fn cli_global_overrides_default() {
    let global = GlobalOptions::default();
    assert!(global.to_config_overrides().is_empty());
}

#[test]
fn cli_repeated_set_options() {
    let cli = Cli::try_parse_from([
        "retarget",
        "-s",
        "git.fetch=true",
        "-s",
        "scan/skip_dirs=[]",
        "options",
    ])
    .unwrap();
    assert_eq!(
        cli.global.to_config_overrides(),
        ["git.fetch=true", "scan/skip_dirs=[]"]
    );
}
