// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Scan command implementation for retarget-rs.
//!
//! Runs the project edits in preview mode against the current checkout. No
//! git process is started and no file is written.

use anyhow::Context;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::update::ScanArgs;
use crate::config::Config;
use crate::error::Result;
use crate::git::backend::{GitQuery, GixBackend};
use crate::project::descriptor::{DescriptorKind, DescriptorUpdate, update_descriptor};
use crate::project::ignore_file::{IGNORE_FILE, ensure_ignore_entry};
use crate::project::locate::locate_descriptors;

/// A descriptor that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// What an update would do to the current checkout.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub descriptors: Vec<DescriptorUpdate>,
    pub malformed: Vec<ScanFailure>,
    pub ignore_file_changed: bool,
}

impl ScanReport {
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.descriptors.iter().filter(|d| d.is_modified()).count()
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for update in &self.descriptors {
            writeln!(f, "{}", update.path.display())?;
            for change in &update.changes {
                writeln!(f, "  {change}")?;
            }
        }
        for failure in &self.malformed {
            writeln!(f, "{} (skipped)", failure.path.display())?;
            writeln!(f, "  {}", failure.reason)?;
        }
        let ignore = if self.ignore_file_changed {
            "entry would be added"
        } else {
            "entry present"
        };
        writeln!(f, "{IGNORE_FILE}: {ignore}")?;
        writeln!(
            f,
            "{} of {} project files would change",
            self.changed_count(),
            self.descriptors.len() + self.malformed.len()
        )
    }
}

/// Builds the preview report for the work tree at `root`.
///
/// # Errors
///
/// Returns an error if the tree cannot be scanned or `.gitignore` cannot be
/// read. Malformed descriptors are reported, not returned.
pub fn scan_tree(root: &Path, config: &Config) -> Result<ScanReport> {
    let files = locate_descriptors(root, &config.descriptor, &config.scan)
        .context("Failed to locate project files")?;

    let mut report = ScanReport::default();
    for path in files {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        let kind = DescriptorKind::of(&path, &config.descriptor.primary_extension);
        match update_descriptor(&path, kind, &config.descriptor, true) {
            Ok(update) => report.descriptors.push(DescriptorUpdate {
                path: relative,
                ..update
            }),
            Err(e) => report.malformed.push(ScanFailure {
                path: relative,
                reason: e.to_string(),
            }),
        }
    }
    report.ignore_file_changed = ensure_ignore_entry(root, &config.ignore, true)?;
    Ok(report)
}

/// Main handler for scan command.
///
/// # Errors
///
/// Returns an error if the path is not inside a work tree or the scan fails.
pub fn run_scan_command(args: &ScanArgs, config: &Config) -> Result<()> {
    let root = GixBackend::workdir(&args.repo)
        .with_context(|| format!("Failed to open repository {}", args.repo.display()))?;
    let report = scan_tree(&root, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
