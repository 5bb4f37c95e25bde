// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config layers --> Logging --> Command Dispatch
//!   Update | Branches | Scan | Options | Inis | Version
//! ```

use std::process::ExitCode;

use retarget_rs::cli::{self, Command};
use retarget_rs::cmd::branches::run_branches_command;
use retarget_rs::cmd::config::{run_inis_command, run_options_command};
use retarget_rs::cmd::scan::run_scan_command;
use retarget_rs::cmd::update::run_update_command;
use retarget_rs::config::Config;
use retarget_rs::config::loader::ConfigLoader;
use retarget_rs::logging::{LogConfig, LogGuard, init_logging};
use tokio_util::sync::CancellationToken;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_INI: &str = "retarget.toml";
const ENV_PREFIX: &str = "RETARGET";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let Some(command) = &cli.command else {
        eprintln!("No command specified. Use --help for usage information.");
        return ExitCode::FAILURE;
    };

    if matches!(command, Command::Version) {
        handle_version_command();
        return ExitCode::SUCCESS;
    }

    if matches!(command, Command::Inis) {
        run_inis_command(&build_config_loader(&cli).format_loaded_files());
        return ExitCode::SUCCESS;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match start_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(command, &config).await
}

async fn dispatch_command(command: &Command, config: &Config) -> ExitCode {
    let result = match command {
        Command::Options => {
            run_options_command(config);
            Ok(())
        }
        Command::Update(args) => {
            let token = cancel_on_ctrl_c();
            run_update_command(args, config, token).await.map(|_| ())
        }
        Command::Branches(args) => run_branches_command(args, config).await,
        Command::Scan(args) => run_scan_command(args, config),
        Command::Version | Command::Inis => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Cancels the returned token on the first Ctrl+C. The run stops before the
/// next branch.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current branch");
            child.cancel();
        }
    });
    token
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(cli: &cli::Cli) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !cli.global.no_default_inis {
        loader = loader.add_toml_file_optional(DEFAULT_INI);
    }
    for ini_path in &cli.global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader.with_env_prefix(ENV_PREFIX)
}

fn load_config(cli: &cli::Cli) -> retarget_rs::error::Result<Config> {
    let mut overrides = cli.global.to_config_overrides();
    if let Some(command) = &cli.command {
        overrides.extend(command.to_config_overrides());
    }
    build_config_loader(cli).apply_overrides(&overrides)?.build()
}

fn start_logging(config: &Config) -> retarget_rs::error::Result<LogGuard> {
    let log_config = LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(
            config
                .global
                .log_file
                .as_ref()
                .map(|p| p.display().to_string()),
        )
        .build();
    init_logging(&log_config)
}
