// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parallel glob search over a directory tree.
//!
//! ```text
//! find_files(root, "**/*.{csproj,fsproj}", &options)
//!   ignore::WalkParallel        (filter_entry prunes skip_dirs)
//!     --> wax::Glob match on path relative to root
//!     --> flume channel
//!   collect + sort
//!   --> WalkResult { files, error_count }
//! ```

use crate::error::{FsError, RetargetResult};
use bon::Builder;
use flume::bounded;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Options for parallel directory traversal.
///
/// `.gitignore` rules never prune the walk: a committed descriptor is edited
/// even if an ignore rule would match it.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// Include hidden files/directories
    #[builder(setters(name = with_include_hidden), default = false)]
    include_hidden: bool,
    /// Skip directories matching these names (exact match, never the root)
    #[builder(setters(name = with_skip_dirs), default)]
    skip_dirs: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    #[must_use]
    pub fn skip_dirs(&self) -> &[String] {
        &self.skip_dirs
    }

    /// Options for scanning a working tree for project files.
    ///
    /// An empty skip list turns off all pruning, hidden entries included.
    #[must_use]
    pub fn for_project_scan(skip_dirs: &[String]) -> Self {
        Self::builder()
            .with_include_hidden(skip_dirs.is_empty())
            .with_skip_dirs(skip_dirs.to_vec())
            .build()
    }
}

/// Result of a walk: matching files (sorted) and the number of entries that
/// could not be read.
#[derive(Debug, Default)]
pub struct WalkResult {
    files: Vec<PathBuf>,
    error_count: usize,
}

impl WalkResult {
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    #[must_use]
    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }

    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }
}

/// Builds a `WalkBuilder` with the given options, using `filter_entry` for directory skipping.
fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    builder.hidden(!options.include_hidden());
    builder.git_ignore(false);
    builder.git_global(false);
    builder.git_exclude(false);
    builder.ignore(false);
    builder.parents(false);

    // Evaluated before descending; depth 0 is the root itself.
    if !options.skip_dirs().is_empty() {
        let skip_dirs: Arc<Vec<String>> = Arc::new(options.skip_dirs().to_vec());
        builder.filter_entry(move |entry| {
            !(entry.depth() > 0
                && entry.file_type().is_some_and(|ft| ft.is_dir())
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| skip_dirs.iter().any(|skip| skip == name)))
        });
    }

    builder
}

/// Finds files matching a glob pattern using parallel traversal.
///
/// The pattern is matched against the path relative to `root`. Results are
/// sorted so callers see a stable order regardless of thread scheduling.
///
/// # Errors
///
/// Returns:
/// - `FsError::NotFound` if the root directory does not exist.
/// - `FsError::IoError` (kind `InvalidInput`) if the glob pattern is invalid.
///
/// # Example
/// ```no_run
/// use retarget_rs::utility::fs::walk::{find_files, WalkOptions};
///
/// let result = find_files("/path/to/repo", "**/*.csproj", &WalkOptions::default())?;
/// for file in result.files() {
///     println!("{}", file.display());
/// }
/// # Ok::<(), retarget_rs::error::RetargetError>(())
/// ```
pub fn find_files<P: AsRef<Path>>(
    root: P,
    pattern: &str,
    options: &WalkOptions,
) -> RetargetResult<WalkResult> {
    use wax::{Glob, Program};

    let root = root.as_ref();

    if !root.is_dir() {
        return Err(FsError::NotFound(root.display().to_string()).into());
    }

    let glob = Glob::new(pattern).map_err(|e| FsError::IoError {
        path: pattern.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid glob pattern: {e}"),
        ),
    })?;

    let (tx, rx) = bounded::<PathBuf>(1000);
    let error_count = Arc::new(AtomicUsize::new(0));
    let glob = Arc::new(glob);
    let root_path = root.to_path_buf();

    let parallel = build_walker(root, options).build_parallel();

    std::thread::scope(|scope| {
        // Drain concurrently so a large tree cannot fill the bounded channel.
        let collector = scope.spawn(|| rx.iter().collect::<Vec<_>>());

        parallel.run(|| {
            let tx = tx.clone();
            let glob = Arc::clone(&glob);
            let root_path = root_path.clone();
            let error_count = Arc::clone(&error_count);

            Box::new(move |entry_result| {
                match entry_result {
                    Ok(entry) => {
                        if entry.file_type().is_some_and(|ft| ft.is_file())
                            && let Ok(rel_path) = entry.path().strip_prefix(&root_path)
                            && glob.is_match(rel_path)
                        {
                            let _ = tx.send(entry.path().to_path_buf());
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "walk error");
                        error_count.fetch_add(1, Ordering::Relaxed);
                    }
                }
                ignore::WalkState::Continue
            })
        });

        drop(tx);
        let mut files = collector.join().unwrap_or_default();
        files.sort();
        Ok(WalkResult {
            files,
            error_count: error_count.load(Ordering::Relaxed),
        })
    })
}
