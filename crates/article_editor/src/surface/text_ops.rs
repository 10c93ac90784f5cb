// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Typing: inserting text, deleting ranges and graphemes, splitting blocks.

use unicode_segmentation::UnicodeSegmentation;

use super::segments::{byte_index, utf16_len, InsertPoint, Segment, SegmentKind};
use super::{
    boundary_for, inline_group, inline_root, nearest_block, split_up_to,
    top_inline_ancestor, EditingSurface,
};
use crate::dom::nodes::ElementNode;
use crate::dom::tags::{heading_level, is_table_part};
use crate::dom::{Dom, DomHandle};
use crate::{CommandError, Selection};

impl EditingSurface {
    /// Replace the selection with `text` and put the cursor after it.
    pub(crate) fn replace_text(&mut self, text: &str) -> Result<(), CommandError> {
        let selection = self.selection.ok_or(CommandError::NoSelection)?;
        let start = selection.start();
        self.delete_range(start, selection.end());
        if !text.is_empty() {
            self.insert_text_at(start, text);
        }
        self.selection = Some(Selection::cursor(start + utf16_len(text)));
        Ok(())
    }

    /// Delete the selection, or the grapheme before the cursor.
    pub(crate) fn backspace(&mut self) -> Result<(), CommandError> {
        let selection = self.selection.ok_or(CommandError::NoSelection)?;
        if !selection.is_collapsed() {
            self.delete_range(selection.start(), selection.end());
            return Ok(());
        }
        let end = selection.start();
        if end == 0 {
            return Ok(());
        }
        let text = self.segments().plain_text(&self.dom);
        let cursor = byte_index(&text, end);
        let previous = text[..cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.delete_range(utf16_len(&text[..previous]), end);
        Ok(())
    }

    /// Delete the selection, or the grapheme after the cursor.
    pub(crate) fn delete(&mut self) -> Result<(), CommandError> {
        let selection = self.selection.ok_or(CommandError::NoSelection)?;
        if !selection.is_collapsed() {
            self.delete_range(selection.start(), selection.end());
            return Ok(());
        }
        let start = selection.start();
        let text = self.segments().plain_text(&self.dom);
        let cursor = byte_index(&text, start);
        if let Some(next) = text[cursor..].graphemes(true).next() {
            self.delete_range(start, start + utf16_len(next));
        }
        Ok(())
    }

    /// Split the block at the cursor in two. Inside `pre` a newline is
    /// typed instead; where there is no block to split a `br` is inserted.
    pub(crate) fn enter(&mut self) -> Result<(), CommandError> {
        let selection = self.selection.ok_or(CommandError::NoSelection)?;
        let offset = selection.start();
        self.delete_range(offset, selection.end());

        let point = self.segments().insertion_point(offset);
        let block = match point {
            InsertPoint::InText { node, .. }
            | InsertPoint::Before(node)
            | InsertPoint::After(node) => nearest_block(&self.dom, node),
            InsertPoint::Append(block) => Some(block),
            InsertPoint::DocumentEnd => None,
        };

        match block {
            Some(block) if self.dom.has_tag(block, "pre") => {
                self.insert_text_at(offset, "\n");
            }
            Some(block)
                if !self.dom.tag(block).map(is_table_part).unwrap_or(true) =>
            {
                self.split_block(point, block);
            }
            _ => {
                let boundary = boundary_for(&mut self.dom, point);
                let br = self.dom.create_element(ElementNode::new("br"));
                self.dom.insert_child(boundary.parent, boundary.index, br);
            }
        }
        self.selection = Some(Selection::cursor(offset + 1));
        Ok(())
    }

    fn split_block(&mut self, point: InsertPoint, block: DomHandle) {
        let Some(stop) = self.dom.parent(block) else {
            return;
        };
        let boundary = boundary_for(&mut self.dom, point);
        let (_, halves) = split_up_to(&mut self.dom, boundary, stop);
        let Some((_, new_block)) = halves.last().copied() else {
            return;
        };
        // A new line after a heading is a paragraph.
        let is_heading = self.dom.tag(new_block).and_then(heading_level).is_some();
        if is_heading && !self.dom.has_content(new_block) {
            if let Some(el) = self.dom.element_mut(new_block) {
                el.set_tag("p");
            }
        }
        for (left, right) in halves {
            for half in [left, right] {
                if half != block && half != new_block && self.dom.children(half).is_empty() {
                    self.dom.detach(half);
                }
            }
        }
    }

    /// Insert `text` at `offset` without touching the selection.
    pub(crate) fn insert_text_at(&mut self, offset: usize, text: &str) {
        let point = self.segments().insertion_point(offset);
        match point {
            InsertPoint::InText { node, offset } => {
                if let Some(anchor) = self.link_ending_at(node, offset) {
                    let new_text = self.dom.create_text(text);
                    self.dom.insert_after(anchor, new_text);
                } else if let Some(existing) = self.dom.text_mut(node) {
                    let at = byte_index(existing, offset);
                    existing.insert_str(at, text);
                }
            }
            _ => {
                let boundary = boundary_for(&mut self.dom, point);
                let new_text = self.dom.create_text(text);
                self.dom.insert_child(boundary.parent, boundary.index, new_text);
            }
        }
    }

    /// The link that `node` ends, when `offset` is at the very end of it.
    /// Text typed there goes after the link rather than into it.
    fn link_ending_at(&self, node: DomHandle, offset: usize) -> Option<DomHandle> {
        let len = self.dom.text(node).map(utf16_len)?;
        if offset < len {
            return None;
        }
        let root = inline_root(&self.dom, node);
        let anchor = self
            .dom
            .ancestors(node)
            .into_iter()
            .take_while(|h| *h != root)
            .find(|h| self.dom.has_tag(*h, "a"))?;
        let last_text = self
            .dom
            .descendants(anchor)
            .into_iter()
            .filter(|h| self.dom.text(*h).map(|t| !t.is_empty()).unwrap_or(false))
            .last();
        (last_text == Some(node)).then_some(anchor)
    }

    /// Remove everything between `start` and `end`, joining the blocks at
    /// either end when the range crosses a block boundary. Leaves the
    /// cursor at `start`.
    pub(crate) fn delete_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        self.split_text_at(start);
        self.split_text_at(end);
        let map = self.segments();

        let before = map.leaf_ending_at(start).copied();
        let after = map.leaf_starting_at(end).copied();
        let block_of = |seg: &Segment| match seg.kind {
            SegmentKind::EmptyBlock => Some(seg.node),
            _ => nearest_block(&self.dom, seg.node),
        };
        let first_block = before
            .as_ref()
            .or(map.empty_block_at(start))
            .or(map.leaf_starting_at(start))
            .and_then(block_of);
        let last_block = after
            .as_ref()
            .or(map.empty_block_at(end))
            .or(map.leaf_ending_at(end))
            .and_then(block_of);
        let crosses_blocks = map.segments().iter().any(|s| {
            s.kind == SegmentKind::Separator && s.start >= start && s.end <= end
        });
        let doomed: Vec<DomHandle> = map
            .segments()
            .iter()
            .filter(|s| match s.kind {
                SegmentKind::Text | SegmentKind::Atomic => {
                    s.start >= start && s.end <= end
                }
                SegmentKind::EmptyBlock => start < s.start && s.start < end,
                SegmentKind::Separator => false,
            })
            .map(|s| s.node)
            .collect();

        let keep: Vec<DomHandle> = [first_block, last_block]
            .into_iter()
            .flatten()
            .flat_map(|b| std::iter::once(b).chain(self.dom.ancestors(b)))
            .collect();
        for node in doomed {
            let parent = self.dom.parent(node);
            self.dom.detach(node);
            if let Some(parent) = parent {
                prune_empty(&mut self.dom, parent, &keep);
            }
        }

        if crosses_blocks {
            self.join_blocks(first_block, last_block, before, after);
        }
        self.selection = Some(Selection::cursor(start));
    }

    fn join_blocks(
        &mut self,
        first: Option<DomHandle>,
        last: Option<DomHandle>,
        before: Option<Segment>,
        after: Option<Segment>,
    ) {
        let dom = &mut self.dom;
        let keep: Vec<DomHandle> = first
            .into_iter()
            .flat_map(|b| std::iter::once(b).chain(dom.ancestors(b)))
            .collect();
        match (first, last) {
            (x, y) if x == y => {}
            (Some(first), Some(last))
                if !dom.is_ancestor_of(first, last) && !dom.is_ancestor_of(last, first) =>
            {
                for child in leading_inline_children(dom, last) {
                    dom.append_child(first, child);
                }
                prune_empty(dom, last, &keep);
            }
            (_, Some(last)) if first.map_or(true, |f| dom.is_ancestor_of(f, last)) => {
                let Some(before) = before else {
                    return;
                };
                let mut anchor = top_inline_ancestor(dom, before.node);
                for child in leading_inline_children(dom, last) {
                    dom.insert_after(anchor, child);
                    anchor = child;
                }
                prune_empty(dom, last, &keep);
            }
            (Some(first), _) => {
                let Some(after) = after else {
                    return;
                };
                let group = inline_group(dom, after.node);
                let old_parent = group.first().and_then(|h| dom.parent(*h));
                for child in group {
                    dom.append_child(first, child);
                }
                if let Some(old_parent) = old_parent {
                    prune_empty(dom, old_parent, &keep);
                }
            }
            _ => {}
        }
    }

    /// Make sure no text node straddles `offset`.
    pub(crate) fn split_text_at(&mut self, offset: usize) {
        let map = self.segments();
        let inside = map.segments().iter().find(|s| {
            s.kind == SegmentKind::Text && s.start < offset && offset < s.end
        });
        if let Some(seg) = inside {
            split_text_node(&mut self.dom, seg.node, offset - seg.start);
        }
    }
}

/// Split a text node at a UTF-16 offset. The original node keeps the text
/// before the offset and a new sibling after it holds the rest, which is
/// returned.
pub(crate) fn split_text_node(dom: &mut Dom, node: DomHandle, offset: usize) -> DomHandle {
    let tail = match dom.text_mut(node) {
        Some(text) => {
            let at = byte_index(text, offset);
            text.split_off(at)
        }
        None => String::new(),
    };
    let new_node = dom.create_text(tail);
    dom.insert_after(node, new_node);
    new_node
}

/// Children of `block` up to its first block-level child.
fn leading_inline_children(dom: &Dom, block: DomHandle) -> Vec<DomHandle> {
    dom.children(block)
        .iter()
        .copied()
        .take_while(|h| super::is_inline_node(dom, *h))
        .collect()
}

/// Detach `handle` and then each ancestor in turn while they are left
/// without content, stopping at anything in `keep`.
fn prune_empty(dom: &mut Dom, handle: DomHandle, keep: &[DomHandle]) {
    let mut current = Some(handle);
    while let Some(h) = current {
        if h == dom.document() || keep.contains(&h) || dom.element(h).is_none() {
            return;
        }
        if dom.has_content(h) {
            return;
        }
        current = dom.parent(h);
        dom.detach(h);
    }
}
