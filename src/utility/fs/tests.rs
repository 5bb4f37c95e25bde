// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::walk::{WalkOptions, find_files};
use super::write::write_atomic;
use std::path::Path;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "").unwrap();
}

fn relative(root: &Path, files: &[std::path::PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_find_files_sorted() {
    let temp = temp_dir();
    touch(temp.path(), "src/b/B.csproj");
    touch(temp.path(), "src/a/A.fsproj");
    touch(temp.path(), "Root.csproj");
    touch(temp.path(), "README.md");

    let result = find_files(
        temp.path(),
        "**/*.{csproj,fsproj}",
        &WalkOptions::default(),
    )
    .unwrap();

    insta::assert_debug_snapshot!(relative(temp.path(), result.files()), @r#"
    [
        "Root.csproj",
        "src/a/A.fsproj",
        "src/b/B.csproj",
    ]
    "#);
    assert_eq!(result.error_count(), 0);
}

#[test]
fn test_find_files_skip_dirs() {
    let temp = temp_dir();
    touch(temp.path(), "App/App.csproj");
    touch(temp.path(), "App/bin/Debug/App.csproj");
    touch(temp.path(), "App/obj/App.csproj");
    touch(temp.path(), "node_modules/pkg/x.csproj");

    let options = WalkOptions::for_project_scan(&[
        "bin".to_string(),
        "obj".to_string(),
        "node_modules".to_string(),
    ]);
    let result = find_files(temp.path(), "**/*.csproj", &options).unwrap();

    insta::assert_debug_snapshot!(relative(temp.path(), result.files()), @r#"
    [
        "App/App.csproj",
    ]
    "#);
}

#[test]
fn test_find_files_never_skips_root() {
    let temp = temp_dir();
    let root = temp.path().join("bin");
    touch(&root, "Tool.csproj");

    let options = WalkOptions::for_project_scan(&["bin".to_string()]);
    let result = find_files(&root, "**/*.csproj", &options).unwrap();

    assert_eq!(result.files().len(), 1);
}

#[test]
fn test_find_files_skips_hidden() {
    let temp = temp_dir();
    touch(temp.path(), ".hidden/Secret.csproj");
    touch(temp.path(), "Visible.csproj");

    let result = find_files(temp.path(), "**/*.csproj", &WalkOptions::default()).unwrap();

    assert_eq!(relative(temp.path(), result.files()), ["Visible.csproj"]);
}

#[test]
fn test_project_scan_without_skip_dirs_includes_hidden() {
    let temp = temp_dir();
    touch(temp.path(), ".config/Tool.csproj");
    touch(temp.path(), "App/bin/App.csproj");

    let options = WalkOptions::for_project_scan(&[]);
    assert!(options.include_hidden());
    let result = find_files(temp.path(), "**/*.csproj", &options).unwrap();

    assert_eq!(
        relative(temp.path(), result.files()),
        [".config/Tool.csproj", "App/bin/App.csproj"]
    );
}

#[test]
fn test_find_files_ignores_gitignore_by_default() {
    let temp = temp_dir();
    std::fs::write(temp.path().join(".gitignore"), "*.csproj\n").unwrap();
    touch(temp.path(), "App.csproj");

    let result = find_files(temp.path(), "**/*.csproj", &WalkOptions::default()).unwrap();

    assert_eq!(result.files().len(), 1);
}

#[test]
fn test_find_files_missing_root() {
    let temp = temp_dir();
    let err = find_files(
        temp.path().join("missing"),
        "**/*.csproj",
        &WalkOptions::default(),
    )
    .unwrap_err();
    assert!(err.to_string().starts_with("filesystem error: path not found"));
}

#[test]
fn test_find_files_invalid_pattern() {
    let temp = temp_dir();
    let result = find_files(temp.path(), "**/*.{csproj", &WalkOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_write_atomic_replaces_contents() {
    let temp = temp_dir();
    let path = temp.path().join("App.csproj");
    std::fs::write(&path, "old").unwrap();

    write_atomic(&path, b"new").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    let leftovers = std::fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[cfg(unix)]
#[test]
fn test_write_atomic_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = temp_dir();
    let path = temp.path().join(".gitignore");
    std::fs::write(&path, "bin/\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    write_atomic(&path, b"bin/\n.vs/\n").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}
