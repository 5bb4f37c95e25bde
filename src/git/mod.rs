// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!            workflow
//!               |
//!               v
//!      ,------------------,
//!      |  VersionControl  |   (trait, BoxFuture methods)
//!      '--------+---------'
//!               |
//!               v
//!         GitRepository
//!          /          \
//!         v            v
//!    GixBackend    ShellBackend
//!   (gix, read)    (git CLI, write)
//!   .workdir       .for-each-ref
//!   .branch        .checkout / add / commit
//!   .uncommitted   .push / fetch / reset
//! ```
//!
//! **`GixBackend`** — pure Rust, no subprocess, read-only.
//! **`ShellBackend`** — git CLI for everything that writes refs or talks to a
//! remote, so credentials and hooks behave exactly as they do for the user.

pub mod backend;
pub mod branches;
pub mod repository;

#[cfg(test)]
mod tests;
