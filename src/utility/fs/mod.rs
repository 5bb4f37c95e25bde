// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities.
//!
//! ```text
//! walk:  find_files()     ignore::WalkParallel + wax glob, sorted
//!        WalkOptions      hidden, skip_dirs
//! write: write_atomic()   tempfile + rename
//! ```

pub mod walk;
pub mod write;

#[cfg(test)]
mod tests;
