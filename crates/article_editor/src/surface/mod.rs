// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The editing surface: the document tree plus the user's selection, and
//! every mutation commands and typing make to it.

pub(crate) mod block_ops;
pub(crate) mod inline_runs;
pub(crate) mod insert;
pub(crate) mod segments;
pub(crate) mod text_ops;

use crate::dom::nodes::NodeData;
use crate::dom::tags::{is_atomic_tag, is_block_tag, is_list_tag};
use crate::dom::{parse, Dom, DomHandle};
use crate::Selection;

use self::segments::{InsertPoint, SegmentMap};

/// Compact the arena once detached nodes outnumber attached ones by this
/// factor.
const GARBAGE_FACTOR: usize = 4;

#[derive(Clone, Debug, Default)]
pub struct EditingSurface {
    pub(crate) dom: Dom,
    pub(crate) selection: Option<Selection>,
}

impl EditingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_html(html: &str) -> Self {
        Self {
            dom: parse(html),
            selection: None,
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Length of the flattened document in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.segments().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_html(&self) -> String {
        self.dom.to_html()
    }

    /// Set the selection, pulling offsets past the end back into the
    /// document.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        let len = self.len();
        self.selection = selection.map(|s| s.clamped(len));
    }

    /// Swap in a new tree, keeping the selection where it still fits.
    pub(crate) fn replace_dom(&mut self, dom: Dom) {
        self.dom = dom;
        self.set_selection(self.selection);
    }

    pub(crate) fn segments(&self) -> SegmentMap {
        SegmentMap::build(&self.dom)
    }

    pub(crate) fn compact_if_needed(&mut self) {
        if self.dom.arena_len() > GARBAGE_FACTOR * self.dom.attached_len() {
            self.dom = self.dom.compacted();
        }
    }
}

/// The nearest block element containing `handle`, or `handle` itself when
/// it is a block. Atomic blocks such as `hr` are skipped.
pub(crate) fn nearest_block(dom: &Dom, handle: DomHandle) -> Option<DomHandle> {
    std::iter::once(handle)
        .chain(dom.ancestors(handle))
        .find(|h| is_container_block(dom, *h))
}

/// The element whose inline children `handle` sits among: its nearest
/// strict block ancestor, or the document.
pub(crate) fn inline_root(dom: &Dom, handle: DomHandle) -> DomHandle {
    dom.ancestors(handle)
        .into_iter()
        .find(|h| is_container_block(dom, *h))
        .unwrap_or_else(|| dom.document())
}

fn is_container_block(dom: &Dom, handle: DomHandle) -> bool {
    dom.tag(handle)
        .map(|tag| is_block_tag(tag) && !is_atomic_tag(tag))
        .unwrap_or(false)
}

/// Text, comments and elements that flow inside a line.
pub(crate) fn is_inline_node(dom: &Dom, handle: DomHandle) -> bool {
    match dom.data(handle) {
        NodeData::Text(_) | NodeData::Comment(_) => true,
        NodeData::Element(el) => !is_block_tag(el.tag()),
        NodeData::Document => false,
    }
}

/// The ancestor-or-self of `handle` that is a direct child of its inline
/// root.
pub(crate) fn top_inline_ancestor(dom: &Dom, handle: DomHandle) -> DomHandle {
    let root = inline_root(dom, handle);
    std::iter::once(handle)
        .chain(dom.ancestors(handle))
        .find(|h| dom.parent(*h) == Some(root))
        .unwrap_or(handle)
}

/// The run of consecutive inline siblings `handle` belongs to, as direct
/// children of its inline root.
pub(crate) fn inline_group(dom: &Dom, handle: DomHandle) -> Vec<DomHandle> {
    let top = top_inline_ancestor(dom, handle);
    let Some(parent) = dom.parent(top) else {
        return vec![top];
    };
    let siblings = dom.children(parent);
    let Some(index) = siblings.iter().position(|h| *h == top) else {
        return vec![top];
    };
    let mut first = index;
    while first > 0 && is_inline_node(dom, siblings[first - 1]) {
        first -= 1;
    }
    let mut last = index;
    while last + 1 < siblings.len() && is_inline_node(dom, siblings[last + 1]) {
        last += 1;
    }
    siblings[first..=last].to_vec()
}

/// The nearest `li` that sits directly in a list.
pub(crate) fn list_item_of(dom: &Dom, handle: DomHandle) -> Option<DomHandle> {
    std::iter::once(handle).chain(dom.ancestors(handle)).find(|h| {
        dom.has_tag(*h, "li")
            && dom
                .parent(*h)
                .and_then(|p| dom.tag(p))
                .map(is_list_tag)
                .unwrap_or(false)
    })
}

/// A position between two children: content inserted there goes at
/// `index` among the children of `parent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Boundary {
    pub(crate) parent: DomHandle,
    pub(crate) index: usize,
}

/// Turn an insertion point into a child boundary, splitting a text node if
/// the point is in the middle of one.
pub(crate) fn boundary_for(dom: &mut Dom, point: InsertPoint) -> Boundary {
    match point {
        InsertPoint::InText { node, offset } => {
            let len = dom.text(node).map(segments::utf16_len).unwrap_or(0);
            if offset == 0 {
                boundary_around(dom, node, false)
            } else if offset >= len {
                boundary_around(dom, node, true)
            } else {
                text_ops::split_text_node(dom, node, offset);
                boundary_around(dom, node, true)
            }
        }
        InsertPoint::Before(node) => boundary_around(dom, node, false),
        InsertPoint::After(node) => boundary_around(dom, node, true),
        InsertPoint::Append(block) => Boundary {
            parent: block,
            index: dom.children(block).len(),
        },
        InsertPoint::DocumentEnd => document_end(dom),
    }
}

fn boundary_around(dom: &Dom, node: DomHandle, after: bool) -> Boundary {
    match (dom.parent(node), dom.index_in_parent(node)) {
        (Some(parent), Some(index)) => Boundary {
            parent,
            index: index + usize::from(after),
        },
        _ => document_end(dom),
    }
}

fn document_end(dom: &Dom) -> Boundary {
    Boundary {
        parent: dom.document(),
        index: dom.children(dom.document()).len(),
    }
}

/// Split every element from the boundary's parent up to, but excluding,
/// `stop`. Returns the boundary between the halves as a child position of
/// `stop`, and each `(left, right)` pair that was created, innermost first.
pub(crate) fn split_up_to(
    dom: &mut Dom,
    boundary: Boundary,
    stop: DomHandle,
) -> (Boundary, Vec<(DomHandle, DomHandle)>) {
    let Boundary {
        mut parent,
        mut index,
    } = boundary;
    let mut halves = Vec::new();
    while parent != stop {
        let (Some(grandparent), Some(element)) =
            (dom.parent(parent), dom.element(parent).cloned())
        else {
            break;
        };
        let right = dom.create_element(element);
        let moving = dom.children(parent).get(index..).unwrap_or(&[]).to_vec();
        for child in moving {
            dom.append_child(right, child);
        }
        dom.insert_after(parent, right);
        halves.push((parent, right));
        index = dom.index_in_parent(parent).map(|i| i + 1).unwrap_or(0);
        parent = grandparent;
    }
    (Boundary { parent, index }, halves)
}

#[cfg(test)]
pub(crate) mod testutils {
    //! Build a surface from HTML with the selection marked inline: `|` is
    //! the cursor (or the focus of a range) and `{` `}` delimit a range.

    use super::segments::SegmentMap;
    use super::EditingSurface;
    use crate::dom::{parse, Dom};
    use crate::Selection;

    const OPEN: char = '\u{E000}';
    const CLOSE: char = '\u{E001}';
    const CURSOR: char = '\u{E002}';

    pub(crate) fn surface(marked: &str) -> EditingSurface {
        let html = marked
            .replace('{', &OPEN.to_string())
            .replace('}', &CLOSE.to_string())
            .replace('|', &CURSOR.to_string());
        let mut dom = parse(&html);
        let markers = take_markers(&mut dom);
        let find = |m: char| markers.iter().find(|(c, _)| *c == m).map(|(_, o)| *o);
        let selection = match (find(OPEN), find(CLOSE), find(CURSOR)) {
            (Some(start), Some(end), Some(cursor)) if cursor == start => {
                Some(Selection::new(end, start))
            }
            (Some(start), Some(end), _) => Some(Selection::new(start, end)),
            (_, _, Some(cursor)) => Some(Selection::cursor(cursor)),
            _ => None,
        };
        EditingSurface { dom, selection }
    }

    /// Remove the marker characters from the text of `dom` and report the
    /// offset each one was at.
    fn take_markers(dom: &mut Dom) -> Vec<(char, usize)> {
        let map = SegmentMap::build(dom);
        let mut found = Vec::new();
        let mut removed = 0;
        for seg in map.segments() {
            let Some(text) = dom.text(seg.node) else {
                continue;
            };
            let mut units = 0;
            for c in text.chars() {
                if [OPEN, CLOSE, CURSOR].contains(&c) {
                    found.push((c, seg.start + units - removed));
                    removed += 1;
                }
                units += c.len_utf16();
            }
        }
        for seg in map.segments() {
            let mut now_empty = false;
            if let Some(text) = dom.text_mut(seg.node) {
                text.retain(|c| ![OPEN, CLOSE, CURSOR].contains(&c));
                now_empty = text.is_empty();
            }
            if now_empty {
                dom.detach(seg.node);
            }
        }
        found
    }

    #[test]
    fn markers_become_the_selection() {
        let s = surface("<p>ab{cd}|e</p>");
        assert_eq!(s.to_html(), "<p>abcde</p>");
        assert_eq!(s.selection, Some(Selection::new(2, 4)));

        let s = surface("<p>|{ab}</p><p>c</p>");
        assert_eq!(s.selection, Some(Selection::new(2, 0)));

        let s = surface("<p>a</p><p>|</p>");
        assert_eq!(s.to_html(), "<p>a</p><p></p>");
        assert_eq!(s.selection, Some(Selection::cursor(2)));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inline_group_stops_at_blocks() {
        let dom = parse("a<b>b</b><p>c</p>d");
        let doc = dom.document();
        let children = dom.children(doc).to_vec();
        let bold_text = dom.children(children[1])[0];
        assert_eq!(inline_group(&dom, bold_text), children[0..2].to_vec());
        assert_eq!(inline_group(&dom, children[3]), vec![children[3]]);
    }

    #[test]
    fn split_up_to_clones_each_level() {
        let mut dom = parse("<p><b>abcd</b></p>");
        let map = SegmentMap::build(&dom);
        let text = map.segments()[0].node;
        let boundary =
            boundary_for(&mut dom, InsertPoint::InText { node: text, offset: 2 });
        let doc = dom.document();
        let (at, halves) = split_up_to(&mut dom, boundary, doc);
        assert_eq!(dom.to_html(), "<p><b>ab</b></p><p><b>cd</b></p>");
        assert_eq!(at, Boundary { parent: doc, index: 1 });
        assert_eq!(halves.len(), 2);
        dom.assert_invariants();
    }

    #[test]
    fn list_item_of_finds_items_in_lists_only() {
        let dom = parse("<ul><li><p>x</p></li></ul>");
        let map = SegmentMap::build(&dom);
        let text = map.segments()[0].node;
        let li = dom.children(dom.children(dom.document())[0])[0];
        assert_eq!(list_item_of(&dom, text), Some(li));
    }
}
