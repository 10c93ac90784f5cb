// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Flattening of the surface into a sequence of positioned segments.
//!
//! Offsets are UTF-16 code units. Text contributes its length, `br`, `img`
//! and `hr` contribute one unit each, and one separator unit is placed
//! between the content of two different blocks. A block with no content
//! gets a zero-length segment so that a cursor can be put inside it.

use crate::dom::nodes::NodeData;
use crate::dom::tags::{is_atomic_tag, is_block_tag, is_non_rendered_tag};
use crate::dom::{Dom, DomHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    Text,
    Atomic,
    Separator,
    EmptyBlock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) kind: SegmentKind,
    /// The text node, atomic element or empty block. For separators, the
    /// leaf that follows the separator.
    pub(crate) node: DomHandle,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Segment {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, SegmentKind::Text | SegmentKind::Atomic)
    }
}

/// Where new content goes for a given offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InsertPoint {
    /// Inside a text node, at a UTF-16 offset relative to the node.
    InText { node: DomHandle, offset: usize },
    Before(DomHandle),
    After(DomHandle),
    /// At the end of an empty block.
    Append(DomHandle),
    DocumentEnd,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SegmentMap {
    segments: Vec<Segment>,
    len: usize,
}

impl SegmentMap {
    pub(crate) fn build(dom: &Dom) -> Self {
        let mut walker = Walker {
            dom,
            segments: Vec::new(),
            offset: 0,
            has_content: false,
            pending_separator: false,
        };
        walker.visit(dom.document());
        Self {
            len: walker.offset,
            segments: walker.segments,
        }
    }

    /// Total length of the flattened document.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The text or atomic leaf that ends exactly at `offset`.
    pub(crate) fn leaf_ending_at(&self, offset: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.is_leaf() && s.end == offset)
    }

    /// The text or atomic leaf that starts exactly at `offset`.
    pub(crate) fn leaf_starting_at(&self, offset: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.is_leaf() && s.start == offset)
    }

    pub(crate) fn empty_block_at(&self, offset: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.kind == SegmentKind::EmptyBlock && s.start == offset)
    }

    /// The leaf a cursor at `offset` is in, preferring the one before it.
    pub(crate) fn leaf_at(&self, offset: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.is_leaf() && s.start < offset && offset < s.end)
            .or_else(|| self.leaf_ending_at(offset))
            .or_else(|| self.leaf_starting_at(offset))
            .or_else(|| self.empty_block_at(offset))
    }

    /// Leaves and empty blocks touched by the range `start..end`. A
    /// collapsed range yields the leaf the cursor is in.
    pub(crate) fn leaves_in(&self, start: usize, end: usize) -> Vec<Segment> {
        if start == end {
            return self.leaf_at(start).copied().into_iter().collect();
        }
        self.segments
            .iter()
            .filter(|s| match s.kind {
                SegmentKind::Text | SegmentKind::Atomic => {
                    s.start < end && s.end > start
                }
                SegmentKind::EmptyBlock => start <= s.start && s.start <= end,
                SegmentKind::Separator => false,
            })
            .copied()
            .collect()
    }

    pub(crate) fn insertion_point(&self, offset: usize) -> InsertPoint {
        let inside = self.segments.iter().find(|s| {
            s.kind == SegmentKind::Text && s.start < offset && offset < s.end
        });
        if let Some(seg) = inside {
            return InsertPoint::InText {
                node: seg.node,
                offset: offset - seg.start,
            };
        }
        if let Some(seg) = self.leaf_ending_at(offset) {
            return match seg.kind {
                SegmentKind::Text => InsertPoint::InText {
                    node: seg.node,
                    offset: seg.end - seg.start,
                },
                _ => InsertPoint::After(seg.node),
            };
        }
        if let Some(seg) = self.leaf_starting_at(offset) {
            return match seg.kind {
                SegmentKind::Text => InsertPoint::InText {
                    node: seg.node,
                    offset: 0,
                },
                _ => InsertPoint::Before(seg.node),
            };
        }
        match self.empty_block_at(offset) {
            Some(seg) => InsertPoint::Append(seg.node),
            None => InsertPoint::DocumentEnd,
        }
    }

    /// The flattened document as a string with the same UTF-16 offsets:
    /// separators become `\n` and atomic elements U+FFFC.
    pub(crate) fn plain_text(&self, dom: &Dom) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg.kind {
                SegmentKind::Text => out.push_str(dom.text(seg.node).unwrap_or("")),
                SegmentKind::Atomic => out.push('\u{FFFC}'),
                SegmentKind::Separator => out.push('\n'),
                SegmentKind::EmptyBlock => {}
            }
        }
        out
    }
}

struct Walker<'a> {
    dom: &'a Dom,
    segments: Vec<Segment>,
    offset: usize,
    has_content: bool,
    pending_separator: bool,
}

impl Walker<'_> {
    fn visit(&mut self, handle: DomHandle) {
        match self.dom.data(handle) {
            NodeData::Document => self.visit_children(handle),
            NodeData::Comment(_) => {}
            NodeData::Text(text) => {
                if !text.is_empty() {
                    self.push(SegmentKind::Text, handle, utf16_len(text));
                }
            }
            NodeData::Element(el) => {
                let tag = el.tag();
                if is_non_rendered_tag(tag) {
                    return;
                }
                let block = is_block_tag(tag);
                if block {
                    self.block_boundary();
                }
                if is_atomic_tag(tag) {
                    self.push(SegmentKind::Atomic, handle, 1);
                } else {
                    let before = self.segments.len();
                    self.visit_children(handle);
                    if block && self.segments.len() == before {
                        self.push(SegmentKind::EmptyBlock, handle, 0);
                    }
                }
                if block {
                    self.block_boundary();
                }
            }
        }
    }

    fn visit_children(&mut self, handle: DomHandle) {
        for child in self.dom.children(handle) {
            self.visit(*child);
        }
    }

    fn block_boundary(&mut self) {
        if self.has_content {
            self.pending_separator = true;
        }
    }

    fn push(&mut self, kind: SegmentKind, node: DomHandle, len: usize) {
        if self.pending_separator {
            self.segments.push(Segment {
                kind: SegmentKind::Separator,
                node,
                start: self.offset,
                end: self.offset + 1,
            });
            self.offset += 1;
            self.pending_separator = false;
        }
        self.segments.push(Segment {
            kind,
            node,
            start: self.offset,
            end: self.offset + len,
        });
        self.offset += len;
        self.has_content = true;
    }
}

pub(crate) fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Byte index in `text` of the UTF-16 `offset`. An offset that falls inside
/// a surrogate pair is moved past the character.
pub(crate) fn byte_index(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.char_indices() {
        if units >= offset {
            return i;
        }
        units += c.len_utf16();
    }
    text.len()
}
