// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async process spawning.
//!
//! ```text
//! ProcessBuilder::which("git")
//!   .args() .cwd() .env() .timeout() .capture_output()
//!   .run()
//!       --> tokio::process::Command
//!           drain stdout/stderr concurrently
//!       --> ProcessOutput { exit_code, stdout, stderr }
//! ```

pub mod builder;
mod io;
mod runner;
