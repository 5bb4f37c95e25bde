// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{
    ConfigError, DescriptorError, GitError, ProcessError, RetargetError, RetargetResult,
};

#[test]
fn test_config_error_display() {
    let err = ConfigError::InvalidValue {
        section: "descriptor".to_string(),
        key: "target_framework".to_string(),
        message: "must not be empty".to_string(),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'target_framework' in section '[descriptor]': must not be empty"
    );
}

#[test]
fn test_git_error_boxes_into_retarget_error() {
    let err: RetargetError = GitError::CheckoutFailed {
        what: "dev".to_string(),
        message: "pathspec did not match".to_string(),
    }
    .into();
    assert!(matches!(err, RetargetError::Git(_)));
    insta::assert_snapshot!(
        err.to_string(),
        @"git error: failed to checkout dev: pathspec did not match"
    );
}

#[test]
fn test_descriptor_error_display() {
    let err: RetargetError = DescriptorError::Malformed {
        position: 42,
        message: "unclosed element".to_string(),
    }
    .into();
    insta::assert_snapshot!(
        err.to_string(),
        @"descriptor error: malformed project file at byte 42: unclosed element"
    );
}

#[test]
fn test_process_error_display() {
    let err: RetargetError = ProcessError::ExecutableNotFound {
        name: "git".to_string(),
    }
    .into();
    assert_eq!(
        err.to_string(),
        "process error: executable not found: 'git' (not in PATH)"
    );
}

#[test]
fn test_retarget_error_size() {
    // One thin pointer plus the discriminant
    let size = std::mem::size_of::<RetargetError>();
    assert!(size <= 16, "RetargetError is {size} bytes, expected <= 16");
}

#[test]
fn test_retarget_result_size() {
    let size = std::mem::size_of::<RetargetResult<()>>();
    assert!(size <= 24, "RetargetResult<()> is {size} bytes, expected <= 24");
}
