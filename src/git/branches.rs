// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch names and enumeration parsing.
//!
//! ```text
//! for-each-ref refs/heads            for-each-ref refs/remotes/<remote>
//!   refs/heads/main                    refs/remotes/origin/HEAD   (dropped)
//!   refs/heads/dev                     refs/remotes/origin/main   (dup, local wins)
//!        |                             refs/remotes/origin/feature/x
//!        v                                   |
//!   merge_branches() <-----------------------'
//!        |
//!        v
//!   [main (local), dev (local), feature/x (remote origin)]
//! ```

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A branch name as git spells it, without any `refs/...` prefix.
///
/// Case-sensitive: `Main` and `main` are different branches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Where an enumerated branch lives before it is checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOrigin {
    /// A local branch exists.
    Local,
    /// Only `refs/remotes/<remote>/<name>` exists; a tracking branch is
    /// created when the branch is checked out.
    Remote(String),
}

/// An enumerated branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    name: BranchName,
    origin: BranchOrigin,
}

impl Branch {
    #[must_use]
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: BranchName::new(name),
            origin: BranchOrigin::Local,
        }
    }

    #[must_use]
    pub fn remote(name: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            name: BranchName::new(name),
            origin: BranchOrigin::Remote(remote.into()),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &BranchName {
        &self.name
    }

    #[must_use]
    pub const fn origin(&self) -> &BranchOrigin {
        &self.origin
    }

    /// The ref a detached checkout of this branch points at.
    #[must_use]
    pub fn start_point(&self) -> String {
        match &self.origin {
            BranchOrigin::Local => self.name.to_string(),
            BranchOrigin::Remote(remote) => format!("{remote}/{}", self.name),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            BranchOrigin::Local => write!(f, "{} (local)", self.name),
            BranchOrigin::Remote(remote) => write!(f, "{} (remote {remote})", self.name),
        }
    }
}

/// What HEAD pointed at when the run started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadRef {
    /// HEAD is a symbolic ref to this branch.
    Branch(BranchName),
    /// HEAD is detached at this commit id.
    Detached(String),
}

impl fmt::Display for HeadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(name) => write!(f, "{name}"),
            Self::Detached(sha) => write!(f, "detached at {}", sha.get(..12).unwrap_or(sha)),
        }
    }
}

/// Merges `for-each-ref --format=%(refname)` outputs into the branch list.
///
/// Local branches come first in their listed order, followed by branches only
/// the remote has. The remote's symbolic `HEAD` is dropped, and a remote
/// branch whose name is already local is folded into the local entry.
#[must_use]
pub fn merge_branches(local_refs: &str, remote_refs: &str, remote: &str) -> Vec<Branch> {
    let remote_prefix = format!("refs/remotes/{remote}/");
    let mut seen = BTreeSet::new();
    let mut branches = Vec::new();

    for name in local_refs
        .lines()
        .filter_map(|line| line.trim().strip_prefix("refs/heads/"))
        .filter(|name| !name.is_empty())
    {
        if seen.insert(name.to_string()) {
            branches.push(Branch::local(name));
        }
    }

    for name in remote_refs
        .lines()
        .filter_map(|line| line.trim().strip_prefix(remote_prefix.as_str()))
        .filter(|name| !name.is_empty() && *name != "HEAD")
    {
        if seen.insert(name.to_string()) {
            branches.push(Branch::remote(name, remote));
        }
    }

    branches
}
