// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Project descriptor (MSBuild project file) mutation.
//!
//! ```text
//! update_descriptor(path)
//!   read, strip BOM
//!        |
//!        v
//!   plan_update(text, kind, settings)          pure
//!     layout::scan()  --> Malformed (file skipped)
//!     per field: Unchanged | Updated (content span) | Created (insert)
//!     apply edits back to front
//!        |
//!        v
//!   changed && !preview --> write_atomic(BOM + text)
//! ```
//!
//! Every byte outside the edited spans is preserved, so a second run over
//! the result reports every field unchanged and produces identical bytes.

mod layout;


use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use layout::{Layout, Shape, Span};

use crate::config::types::DescriptorConfig;
use crate::error::{DescriptorError, RetargetResult};
use crate::utility::fs::write::write_atomic;

const BOM: char = '\u{feff}';

/// Which language variant a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    /// The primary managed language; gets `LangVersion` too.
    Primary,
    /// Any other recognized extension; `TargetFramework` only.
    Secondary,
}

impl DescriptorKind {
    /// Kind of `path` given the configured primary extension.
    #[must_use]
    pub fn of(path: &Path, primary_extension: &str) -> Self {
        let is_primary = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(primary_extension));
        if is_primary {
            Self::Primary
        } else {
            Self::Secondary
        }
    }

    const fn fields(self) -> &'static [Field] {
        match self {
            Self::Primary => &[Field::TargetFramework, Field::LangVersion],
            Self::Secondary => &[Field::TargetFramework],
        }
    }
}

/// A property this tool writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Field {
    TargetFramework,
    LangVersion,
}

impl Field {
    pub(crate) const COUNT: usize = 2;

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::TargetFramework => "TargetFramework",
            Self::LangVersion => "LangVersion",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::TargetFramework => 0,
            Self::LangVersion => 1,
        }
    }

    pub(crate) fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"TargetFramework" => Some(Self::TargetFramework),
            b"LangVersion" => Some(Self::LangVersion),
            _ => None,
        }
    }

    fn target(self, settings: &DescriptorConfig) -> &str {
        match self {
            Self::TargetFramework => settings.target_framework.trim(),
            Self::LangVersion => settings.lang_version.trim(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What happened to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: Field,
    /// Current value (unescaped, trimmed); `None` if the field was missing.
    pub before: Option<String>,
    pub after: String,
    pub action: FieldAction,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.action, &self.before) {
            (FieldAction::Created, _) => write!(f, "{}: (missing) -> {}", self.field, self.after),
            (FieldAction::Updated, Some(before)) => {
                write!(f, "{}: {before} -> {}", self.field, self.after)
            }
            _ => write!(f, "{}: {} (unchanged)", self.field, self.after),
        }
    }
}

/// Result of planning an update: the new text and per-field report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorPlan {
    pub content: String,
    pub changes: Vec<FieldChange>,
}

impl DescriptorPlan {
    /// True if any field was created or updated.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.changes
            .iter()
            .any(|c| c.action != FieldAction::Unchanged)
    }
}

/// Outcome of updating one descriptor file.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorUpdate {
    pub path: PathBuf,
    pub kind: DescriptorKind,
    pub changes: Vec<FieldChange>,
}

impl DescriptorUpdate {
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.changes
            .iter()
            .any(|c| c.action != FieldAction::Unchanged)
    }
}

/// Reads, plans and (unless `preview`) rewrites the descriptor at `path`.
///
/// The file is only written when a field changed.
///
/// # Errors
///
/// Returns:
/// - `DescriptorError::Unreadable` if the file cannot be read or is not UTF-8.
/// - `DescriptorError::Malformed` if it is not well-formed; it is left untouched.
/// - `FsError::IoError` if the rewrite fails.
pub fn update_descriptor(
    path: &Path,
    kind: DescriptorKind,
    settings: &DescriptorConfig,
    preview: bool,
) -> RetargetResult<DescriptorUpdate> {
    let unreadable = |source: std::io::Error| DescriptorError::Unreadable {
        path: path.display().to_string(),
        source,
    };
    let bytes = std::fs::read(path).map_err(unreadable)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| unreadable(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let (bom, body) = match text.strip_prefix(BOM) {
        Some(rest) => (&text[..BOM.len_utf8()], rest),
        None => ("", text.as_str()),
    };

    let plan = plan_update(body, kind, settings)?;

    if plan.is_modified() && !preview {
        let mut output = String::with_capacity(bom.len() + plan.content.len());
        output.push_str(bom);
        output.push_str(&plan.content);
        write_atomic(path, output.as_bytes())?;
    }

    Ok(DescriptorUpdate {
        path: path.to_path_buf(),
        kind,
        changes: plan.changes,
    })
}

/// Computes the updated text of a descriptor without touching the disk.
///
/// `source` must not start with a byte order mark.
///
/// # Errors
///
/// Returns `DescriptorError::Malformed` if `source` is not well-formed.
pub fn plan_update(
    source: &str,
    kind: DescriptorKind,
    settings: &DescriptorConfig,
) -> Result<DescriptorPlan, DescriptorError> {
    let layout = layout::scan(source)?;
    let style = Style::detect(source, &layout);

    let mut edits: Vec<Edit> = Vec::new();
    let mut changes = Vec::new();
    let mut missing = Vec::new();

    for &field in kind.fields() {
        let target = field.target(settings);
        let slot = layout
            .group
            .as_ref()
            .and_then(|group| group.fields[field.index()].as_ref());

        match slot {
            None => {
                missing.push(field);
                changes.push(FieldChange {
                    field,
                    before: None,
                    after: target.to_string(),
                    action: FieldAction::Created,
                });
            }
            Some(slot) => {
                let current = slot.value.trim().to_string();
                let action = if current == target {
                    FieldAction::Unchanged
                } else {
                    edits.push(replace_value(source, field, slot.shape, target));
                    FieldAction::Updated
                };
                changes.push(FieldChange {
                    field,
                    before: Some(current),
                    after: target.to_string(),
                    action,
                });
            }
        }
    }

    if !missing.is_empty() {
        edits.push(create_fields(source, &layout, &style, &missing, settings));
    }

    Ok(DescriptorPlan {
        content: apply(source, edits),
        changes,
    })
}

/// A replacement of `span` by `text`; an empty span is an insertion.
#[derive(Debug)]
struct Edit {
    span: Span,
    text: String,
}

fn apply(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| std::cmp::Reverse(edit.span.start));
    let mut out = source.to_string();
    for edit in edits {
        out.replace_range(edit.span.start..edit.span.end, &edit.text);
    }
    out
}

fn element(field: Field, value: &str) -> String {
    let tag = field.tag();
    format!("<{tag}>{}</{tag}>", quick_xml::escape::escape(value))
}

fn replace_value(source: &str, field: Field, shape: Shape, target: &str) -> Edit {
    match shape {
        Shape::Open {
            open_end,
            close_start,
            ..
        } => Edit {
            span: Span {
                start: open_end,
                end: close_start,
            },
            text: quick_xml::escape::escape(target).into_owned(),
        },
        Shape::Empty(span) => Edit {
            span,
            text: format!(
                "{}{}</{}>",
                open_tag_of_empty(source, span),
                quick_xml::escape::escape(target),
                field.tag()
            ),
        },
    }
}

/// Newline and indentation conventions of one file.
struct Style {
    newline: &'static str,
    /// Indentation of children of the root.
    outer: String,
    /// Indentation of children of the property group.
    inner: String,
}

impl Style {
    fn detect(source: &str, layout: &Layout) -> Self {
        let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };

        let outer = layout
            .group
            .as_ref()
            .map(|g| g.shape.start())
            .or(layout.root.first_child_start)
            .and_then(|pos| indent_at(source, pos))
            .unwrap_or("  ")
            .to_string();
        let unit = if outer.is_empty() { "  " } else { outer.as_str() };

        let inner = layout
            .group
            .as_ref()
            .and_then(|g| g.first_child_start)
            .and_then(|pos| indent_at(source, pos))
            .map_or_else(|| format!("{outer}{unit}"), str::to_string);

        Self {
            newline,
            outer,
            inner,
        }
    }

    fn field_lines(&self, fields: &[Field], settings: &DescriptorConfig) -> String {
        fields
            .iter()
            .map(|&f| format!("{}{}{}", self.newline, self.inner, element(f, f.target(settings))))
            .collect()
    }

    fn group_block(&self, fields: &[Field], settings: &DescriptorConfig) -> String {
        format!(
            "<PropertyGroup>{}{}{}</PropertyGroup>",
            self.field_lines(fields, settings),
            self.newline,
            self.outer
        )
    }
}

/// Whitespace between the start of the line and `pos`, if `pos` is the first
/// non-blank character on its line.
fn indent_at(source: &str, pos: usize) -> Option<&str> {
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..pos];
    prefix
        .bytes()
        .all(|b| b == b' ' || b == b'\t')
        .then_some(prefix)
}

/// Start tag text for an element written as `<x .../>`.
fn open_tag_of_empty(source: &str, span: Span) -> String {
    let tag = &source[span.start..span.end];
    let inner = tag.strip_suffix("/>").unwrap_or(tag).trim_end();
    format!("{inner}>")
}

fn create_fields(
    source: &str,
    layout: &Layout,
    style: &Style,
    fields: &[Field],
    settings: &DescriptorConfig,
) -> Edit {
    let nl = style.newline;

    if let Some(group) = &layout.group {
        let lines = style.field_lines(fields, settings);
        return match group.shape {
            Shape::Open {
                open_end,
                close_start,
                ..
            } => {
                if let Some(end) = group.last_child_end {
                    insert(end, lines)
                } else if source[open_end..close_start].contains('\n') {
                    insert(open_end, lines)
                } else {
                    Edit {
                        span: Span {
                            start: open_end,
                            end: close_start,
                        },
                        text: format!("{lines}{nl}{}", style.outer),
                    }
                }
            }
            Shape::Empty(span) => Edit {
                span,
                text: format!(
                    "{}{lines}{nl}{}</PropertyGroup>",
                    open_tag_of_empty(source, span),
                    style.outer
                ),
            },
        };
    }

    let block = format!("{nl}{}{}", style.outer, style.group_block(fields, settings));
    let root_indent = indent_at(source, layout.root.shape.start()).unwrap_or("");

    match layout.root.shape {
        Shape::Open {
            open_end,
            close_start,
            ..
        } => {
            if source[open_end..close_start].contains('\n') {
                insert(open_end, block)
            } else {
                insert(open_end, format!("{block}{nl}{root_indent}"))
            }
        }
        Shape::Empty(span) => Edit {
            span,
            text: format!(
                "{}{block}{nl}{root_indent}</{}>",
                open_tag_of_empty(source, span),
                layout.root.name
            ),
        },
    }
}

fn insert(at: usize, text: String) -> Edit {
    Edit {
        span: Span { start: at, end: at },
        text,
    }
}
