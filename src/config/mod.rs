// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for retarget-rs.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. retarget.toml (cwd, optional)
//! 3. --ini FILE (repeatable)
//! 4. RETARGET_* env vars
//! 5. --set section.key=value
//! 6. command flags (--no-push, --target-framework, ...)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! RETARGET_GIT__REMOTE=upstream              → git.remote = "upstream"
//! RETARGET_DESCRIPTOR__TARGET_FRAMEWORK=net9.0 → descriptor.target_framework
//! RETARGET_GIT__TIMEOUT_SECS=120             → git.timeout_secs = 120
//! ```
//!
//! Section and key are separated by a double underscore so keys may
//! contain single underscores.

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{DescriptorConfig, GitConfig, GlobalConfig, IgnoreConfig, ScanConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Project descriptor settings.
    pub descriptor: DescriptorConfig,
    /// `.gitignore` entry settings.
    pub ignore: IgnoreConfig,
    /// Git behavior.
    pub git: GitConfig,
    /// Project file scanning.
    pub scan: ScanConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use retarget_rs::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("retarget.toml")
    ///     .with_env_prefix("RETARGET")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Normalize and validate values that serde cannot check.
    ///
    /// Extensions lose a leading dot and are lowercased.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` for empty extension lists or
    /// empty field values, since those would silently turn a run into a no-op
    /// or write empty elements.
    pub fn normalize_and_validate(&mut self) -> std::result::Result<(), ConfigError> {
        let normalize = |ext: &str| ext.trim().trim_start_matches('.').to_ascii_lowercase();
        self.descriptor.extensions = self
            .descriptor
            .extensions
            .iter()
            .map(|ext| normalize(ext))
            .filter(|ext| !ext.is_empty())
            .collect();
        self.descriptor.primary_extension = normalize(&self.descriptor.primary_extension);

        let invalid = |section: &str, key: &str, message: &str| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.descriptor.extensions.is_empty() {
            return Err(invalid(
                "descriptor",
                "extensions",
                "at least one extension is required",
            ));
        }
        if self.descriptor.target_framework.trim().is_empty() {
            return Err(invalid("descriptor", "target_framework", "must not be empty"));
        }
        if self.descriptor.lang_version.trim().is_empty() {
            return Err(invalid("descriptor", "lang_version", "must not be empty"));
        }
        if self.ignore.entry.trim().is_empty() {
            return Err(invalid("ignore", "entry", "must not be empty"));
        }
        if self.git.remote.trim().is_empty() {
            return Err(invalid("git", "remote", "must not be empty"));
        }
        Ok(())
    }

    /// Format configuration options for display, one `key = value` per line,
    /// sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_descriptor_options(&mut options);
        self.format_git_options(&mut options);

        options.insert("ignore.entry".into(), self.ignore.entry.clone());
        options.insert("ignore.comment".into(), self.ignore.comment.clone());
        options.insert("scan.skip_dirs".into(), self.scan.skip_dirs.join(", "));

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }

    fn format_descriptor_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "descriptor.extensions".into(),
            self.descriptor.extensions.join(", "),
        );
        options.insert(
            "descriptor.primary_extension".into(),
            self.descriptor.primary_extension.clone(),
        );
        options.insert(
            "descriptor.target_framework".into(),
            self.descriptor.target_framework.clone(),
        );
        options.insert(
            "descriptor.lang_version".into(),
            self.descriptor.lang_version.clone(),
        );
    }

    fn format_git_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("git.remote".into(), self.git.remote.clone());
        options.insert("git.timeout_secs".into(), self.git.timeout_secs.to_string());
        options.insert("git.fetch".into(), self.git.fetch.to_string());
        options.insert("git.push".into(), self.git.push.to_string());
        options.insert(
            "git.push_failure_is_error".into(),
            self.git.push_failure_is_error.to_string(),
        );
        options.insert("git.allow_dirty".into(), self.git.allow_dirty.to_string());
    }
}
