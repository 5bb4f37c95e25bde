// retarget-rs: Multi-branch project retargeting tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Well-formedness check and byte spans of the nodes an edit touches.
//!
//! ```text
//! <Project Sdk="...">                       root (open_end)
//!   <PropertyGroup>                         group.element (open_end)
//!     <OutputType>Exe</OutputType>          first_child_start
//!     <TargetFramework>net6.0</TargetFramework>
//!                      ^^^^^^ value         fields[TargetFramework]
//!   </PropertyGroup>                        last_child_end, close_start
//! </Project>                                close_start
//! ```
//!
//! Only the first `PropertyGroup` that is a direct child of the root and the
//! first occurrence of each field directly inside it are recorded. A field's
//! value is its direct character data and entity references; comments and
//! child elements are not part of it.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::Field;
use crate::error::DescriptorError;

/// A byte range `[start, end)` in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Span {
    pub(super) start: usize,
    pub(super) end: usize,
}

/// How an element is written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Shape {
    /// `<x ...>...</x>`: start tag ends at `open_end`, end tag starts at `close_start`.
    Open {
        start: usize,
        open_end: usize,
        close_start: usize,
    },
    /// `<x .../>`
    Empty(Span),
}

impl Shape {
    pub(super) const fn start(&self) -> usize {
        match self {
            Self::Open { start, .. } => *start,
            Self::Empty(span) => span.start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Root {
    pub(super) name: String,
    pub(super) shape: Shape,
    /// Start of the first child element, used to infer indentation.
    pub(super) first_child_start: Option<usize>,
}

/// A recorded field element and its unescaped text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct FieldSlot {
    pub(super) shape: Shape,
    pub(super) value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Group {
    pub(super) shape: Shape,
    pub(super) first_child_start: Option<usize>,
    pub(super) last_child_end: Option<usize>,
    /// Indexed by `Field::index()`.
    pub(super) fields: [Option<FieldSlot>; Field::COUNT],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Layout {
    pub(super) root: Root,
    pub(super) group: Option<Group>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Root,
    Group,
    Field(Field),
    Other,
}

struct OpenElement {
    name: Vec<u8>,
    start: usize,
    open_end: usize,
    role: Role,
}

/// Partially built layout while events stream in.
#[derive(Default)]
struct Builder {
    root_name: Option<String>,
    root_shape: Option<Shape>,
    root_first_child: Option<usize>,
    group: Option<Group>,
    /// Text collected for the field element currently open.
    field_text: String,
}

const GROUP_TAG: &[u8] = b"PropertyGroup";

fn offset<T: TryInto<usize>>(value: T) -> usize {
    value.try_into().unwrap_or(usize::MAX)
}

fn malformed(position: usize, message: impl Into<String>) -> DescriptorError {
    DescriptorError::Malformed {
        position,
        message: message.into(),
    }
}

/// Start offset of the markup that ends at `end`, given the reader position
/// seen before the event was read.
fn tag_start(src: &str, before: usize, end: usize) -> usize {
    let bytes = src.as_bytes();
    if bytes.get(before) == Some(&b'<') {
        before
    } else if before > 0 && bytes.get(before - 1) == Some(&b'<') {
        before - 1
    } else {
        src[..end.min(src.len())].rfind('<').unwrap_or(before)
    }
}

fn unescaped(raw: &[u8]) -> String {
    let raw = String::from_utf8_lossy(raw);
    quick_xml::escape::unescape(&raw).map_or_else(|_| raw.to_string(), |v| v.into_owned())
}

fn check_attributes(tag: &BytesStart<'_>, position: usize) -> Result<(), DescriptorError> {
    for attr in tag.attributes() {
        attr.map_err(|e| malformed(position, format!("invalid attribute: {e}")))?;
    }
    Ok(())
}

impl Builder {
    /// Role of a new element whose parent is `parent`, updating child
    /// bookkeeping along the way.
    fn classify(
        &mut self,
        parent: Option<Role>,
        name: &[u8],
        start: usize,
    ) -> Result<Role, DescriptorError> {
        match parent {
            None => {
                if self.root_name.is_some() {
                    return Err(malformed(start, "more than one root element"));
                }
                self.root_name = Some(String::from_utf8_lossy(name).into_owned());
                Ok(Role::Root)
            }
            Some(Role::Root) => {
                self.root_first_child.get_or_insert(start);
                if name == GROUP_TAG && self.group.is_none() {
                    Ok(Role::Group)
                } else {
                    Ok(Role::Other)
                }
            }
            Some(Role::Group) => {
                if let Some(group) = self.group.as_mut() {
                    group.first_child_start.get_or_insert(start);
                    if let Some(field) = Field::from_tag(name)
                        && group.fields[field.index()].is_none()
                    {
                        return Ok(Role::Field(field));
                    }
                }
                Ok(Role::Other)
            }
            Some(_) => Ok(Role::Other),
        }
    }

    fn finish_element(&mut self, role: Role, parent: Option<Role>, shape: Shape, end: usize) {
        match role {
            Role::Root => self.root_shape = Some(shape),
            Role::Group => {
                if let Some(group) = self.group.as_mut() {
                    group.shape = shape;
                }
            }
            Role::Field(field) => {
                let value = std::mem::take(&mut self.field_text);
                if let Some(group) = self.group.as_mut() {
                    group.fields[field.index()] = Some(FieldSlot { shape, value });
                }
            }
            Role::Other => {}
        }
        if parent == Some(Role::Group)
            && let Some(group) = self.group.as_mut()
        {
            group.last_child_end = Some(end);
        }
    }

    fn open_group(&mut self, shape: Shape) {
        self.group = Some(Group {
            shape,
            first_child_start: None,
            last_child_end: None,
            fields: [const { None }; Field::COUNT],
        });
    }
}

fn in_field(stack: &[OpenElement]) -> bool {
    stack.last().is_some_and(|e| matches!(e.role, Role::Field(_)))
}

/// Scans `src` (without a byte order mark) and returns the layout.
///
/// # Errors
///
/// Returns `DescriptorError::Malformed` for anything that is not a single
/// well-formed element tree: syntax errors, bad attributes, mismatched or
/// unclosed tags, more than one root, text outside the root, or no root.
pub(super) fn scan(src: &str) -> Result<Layout, DescriptorError> {
    let mut reader = Reader::from_str(src);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut builder = Builder::default();

    loop {
        let before = offset(reader.buffer_position());
        let event = reader
            .read_event()
            .map_err(|e| malformed(offset(reader.error_position()), e.to_string()))?;
        let after = offset(reader.buffer_position());

        match event {
            Event::Start(tag) => {
                let start = tag_start(src, before, after);
                check_attributes(&tag, start)?;
                let parent = stack.last().map(|e| e.role);
                let role = builder.classify(parent, tag.name().as_ref(), start)?;
                if matches!(role, Role::Field(_)) {
                    builder.field_text.clear();
                }
                if role == Role::Group {
                    builder.open_group(Shape::Open {
                        start,
                        open_end: after,
                        close_start: after,
                    });
                }
                stack.push(OpenElement {
                    name: tag.name().as_ref().to_vec(),
                    start,
                    open_end: after,
                    role,
                });
            }
            Event::Empty(tag) => {
                let start = tag_start(src, before, after);
                check_attributes(&tag, start)?;
                let parent = stack.last().map(|e| e.role);
                let role = builder.classify(parent, tag.name().as_ref(), start)?;
                let shape = Shape::Empty(Span { start, end: after });
                if matches!(role, Role::Field(_)) {
                    builder.field_text.clear();
                }
                if role == Role::Group {
                    builder.open_group(shape);
                }
                builder.finish_element(role, parent, shape, after);
            }
            Event::End(tag) => {
                let close_start = tag_start(src, before, after);
                let Some(open) = stack.pop() else {
                    return Err(malformed(close_start, "closing tag without an open element"));
                };
                if open.name.as_slice() != tag.name().as_ref() {
                    return Err(malformed(
                        close_start,
                        format!(
                            "expected </{}>, found </{}>",
                            String::from_utf8_lossy(&open.name),
                            String::from_utf8_lossy(tag.name().as_ref())
                        ),
                    ));
                }
                let parent = stack.last().map(|e| e.role);
                let shape = Shape::Open {
                    start: open.start,
                    open_end: open.open_end,
                    close_start,
                };
                builder.finish_element(open.role, parent, shape, after);
            }
            Event::Text(text) => {
                if stack.is_empty() && !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(malformed(before, "text outside the root element"));
                }
                if in_field(&stack) {
                    builder.field_text.push_str(&unescaped(&text));
                }
            }
            Event::CData(data) => {
                if stack.is_empty() {
                    return Err(malformed(before, "character data outside the root element"));
                }
                if in_field(&stack) {
                    builder.field_text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(reference) => {
                if stack.is_empty() {
                    return Err(malformed(before, "entity reference outside the root element"));
                }
                if in_field(&stack) {
                    let raw = [b"&".as_slice(), &*reference, b";".as_slice()].concat();
                    builder.field_text.push_str(&unescaped(&raw));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(
            src.len(),
            format!("unclosed element <{}>", String::from_utf8_lossy(&open.name)),
        ));
    }

    match (builder.root_name, builder.root_shape) {
        (Some(name), Some(shape)) => Ok(Layout {
            root: Root {
                name,
                shape,
                first_child_start: builder.root_first_child,
            },
            group: builder.group,
        }),
        _ => Err(malformed(src.len(), "no root element")),
    }
}
