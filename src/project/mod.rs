// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Working-tree edits made on every branch.
//!
//! ```text
//! locate      locate_descriptors()   **/*.{csproj,vbproj,fsproj}, sorted
//! descriptor  update_descriptor()    TargetFramework / LangVersion
//! ignore_file ensure_ignore_entry()  append-once .gitignore entry
//! ```
//!
//! Nothing here knows about git: the workflow checks a branch out, then
//! calls these against the work tree.

pub mod descriptor;
pub mod ignore_file;
pub mod locate;
