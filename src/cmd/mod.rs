// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   update, branches, scan, config (options / inis)
//! ```

pub mod branches;
pub mod config;
pub mod scan;
pub mod update;
