// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for retarget-rs.
//!
//! # Config Structure
//!
//! ```text
//! Config
//!   global      log levels, log file
//!   descriptor  extensions, primary extension, TargetFramework/LangVersion values
//!   ignore      .gitignore entry + comment
//!   git         remote, timeout, fetch, push policy
//!   scan        directories the locator never descends into
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Project descriptor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorConfig {
    /// File extensions (without dot) recognized as project descriptors.
    pub extensions: Vec<String>,
    /// Extension of the primary language variant; only these get `LangVersion`.
    pub primary_extension: String,
    /// Value written to `TargetFramework`.
    pub target_framework: String,
    /// Value written to `LangVersion`.
    pub lang_version: String,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                "csproj".to_string(),
                "vbproj".to_string(),
                "fsproj".to_string(),
            ],
            primary_extension: "csproj".to_string(),
            target_framework: "net8.0".to_string(),
            lang_version: "12".to_string(),
        }
    }
}

/// `.gitignore` entry appended to every processed branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IgnoreConfig {
    /// Exclusion pattern, matched against trimmed lines.
    pub entry: String,
    /// Comment line written above the entry.
    pub comment: String,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            entry: ".vs/".to_string(),
            comment: "# Visual Studio cache".to_string(),
        }
    }
}

/// Git behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Remote whose branches are enumerated and pushed to.
    pub remote: String,
    /// Timeout for each git invocation in seconds (0 = none).
    pub timeout_secs: u64,
    /// Fetch the remote before enumerating branches.
    pub fetch: bool,
    /// Push committed branches.
    pub push: bool,
    /// Treat a failed push as a branch failure instead of a warning.
    pub push_failure_is_error: bool,
    /// Run even when the working tree has uncommitted changes.
    pub allow_dirty: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            timeout_secs: 0,
            fetch: false,
            push: true,
            push_failure_is_error: false,
            allow_dirty: false,
        }
    }
}

impl GitConfig {
    /// Timeout as a `Duration`, `None` when disabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

/// Project file scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory names never descended into (build output, package caches).
    pub skip_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_dirs: ["bin", "obj", "node_modules", "packages", ".git", ".vs"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
