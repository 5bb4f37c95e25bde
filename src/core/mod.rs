// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core process management.
//!
//! ```text
//!        core
//!         |
//!         v
//!      process
//!   Builder  --> which() resolution, env, cwd, timeout
//!   Runner   --> spawn, capture stdout/stderr, exit code
//! ```

pub mod process;
