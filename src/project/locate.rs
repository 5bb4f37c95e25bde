// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Project descriptor discovery.

use std::path::{Path, PathBuf};

use crate::config::types::{DescriptorConfig, ScanConfig};
use crate::error::{FsError, RetargetResult};
use crate::utility::fs::walk::{WalkOptions, find_files};

/// Glob matching every configured descriptor extension.
#[must_use]
pub fn descriptor_pattern(extensions: &[String]) -> String {
    match extensions {
        [single] => format!("**/*.{single}"),
        _ => format!("**/*.{{{}}}", extensions.join(",")),
    }
}

/// Sorted descriptor files under `root`, skipping `scan.skip_dirs`.
///
/// # Errors
///
/// Returns an `FsError` if the tree cannot be walked or any directory in it
/// could not be read; a partial list would silently leave files behind.
pub fn locate_descriptors(
    root: &Path,
    descriptor: &DescriptorConfig,
    scan: &ScanConfig,
) -> RetargetResult<Vec<PathBuf>> {
    let pattern = descriptor_pattern(&descriptor.extensions);
    let options = WalkOptions::for_project_scan(&scan.skip_dirs);
    let result = find_files(root, &pattern, &options)?;

    if result.error_count() > 0 {
        return Err(FsError::IoError {
            path: root.display().to_string(),
            source: std::io::Error::other(format!(
                "{} entries could not be read while scanning",
                result.error_count()
            )),
        }
        .into());
    }
    Ok(result.into_files())
}
