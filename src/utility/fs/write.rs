// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Atomic file replacement.
//!
//! ```text
//! write_atomic(path, bytes)
//!   NamedTempFile in path's directory
//!   write + sync
//!   copy permissions of the existing file
//!   persist (rename over path)
//! ```

use std::io::Write;
use std::path::Path;

use crate::error::{FsError, RetargetResult};

fn io_error(path: &Path, source: std::io::Error) -> FsError {
    FsError::IoError {
        path: path.display().to_string(),
        source,
    }
}

/// Replaces `path` with `contents` so readers see either the old or the new
/// file, never a partial write.
///
/// # Errors
///
/// Returns `FsError::IoError` if the temporary file cannot be created,
/// written or renamed over `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> RetargetResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_error(path, e))?;
    tmp.write_all(contents).map_err(|e| io_error(path, e))?;
    tmp.as_file().sync_all().map_err(|e| io_error(path, e))?;

    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| io_error(path, e))?;
    }

    tmp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}
