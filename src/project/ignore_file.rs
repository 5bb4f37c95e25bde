// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `.gitignore` entry insertion.
//!
//! ```text
//! existing (missing = "")
//!   any line.trim() == entry ?  --> None (no change)
//!   else: existing
//!         + newline if it lacks a final one
//!         + "\n# comment\nentry\n"   (CRLF if the file uses CRLF)
//!
//! The blank separator is written even into a new file.
//! ```

use std::path::Path;

use crate::config::types::IgnoreConfig;
use crate::error::{FsError, RetargetResult};
use crate::utility::fs::write::write_atomic;

/// File name of the ignore file at the work tree root.
pub const IGNORE_FILE: &str = ".gitignore";

/// Returns the new file content, or `None` if `entry` is already present.
#[must_use]
pub fn plan_ignore_update(existing: Option<&str>, entry: &str, comment: &str) -> Option<String> {
    let existing = existing.unwrap_or("");
    let entry = entry.trim();
    if existing.lines().any(|line| line.trim() == entry) {
        return None;
    }

    let nl = if existing.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(existing.len() + comment.len() + entry.len() + 6);
    out.push_str(existing);
    if !existing.is_empty() && !existing.ends_with('\n') {
        out.push_str(nl);
    }
    out.push_str(nl);
    let comment = comment.trim();
    if !comment.is_empty() {
        out.push_str(comment);
        out.push_str(nl);
    }
    out.push_str(entry);
    out.push_str(nl);
    Some(out)
}

/// Adds the configured entry to `<root>/.gitignore` unless present.
///
/// Returns whether the file was (or, in preview, would be) modified.
///
/// # Errors
///
/// Returns `FsError::IoError` if the file exists but cannot be read, or the
/// write fails.
pub fn ensure_ignore_entry(
    root: &Path,
    settings: &IgnoreConfig,
    preview: bool,
) -> RetargetResult<bool> {
    let path = root.join(IGNORE_FILE);
    let existing = match std::fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => {
            return Err(FsError::IoError {
                path: path.display().to_string(),
                source,
            }
            .into());
        }
    };

    let Some(updated) = plan_ignore_update(existing.as_deref(), &settings.entry, &settings.comment)
    else {
        return Ok(false);
    };

    if !preview {
        write_atomic(&path, updated.as_bytes())?;
    }
    Ok(true)
}
