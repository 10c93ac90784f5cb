// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::{boundary_for, split_up_to, Boundary, EditingSurface};
use crate::dom::tags::{can_contain_blocks, is_block_tag};
use crate::dom::{Dom, DomHandle};
use crate::Selection;

impl EditingSurface {
    /// Insert the top-level nodes of `fragment` at the cursor.
    ///
    /// A range selection is deleted first. When the fragment holds blocks,
    /// the elements around the cursor are split up to the nearest element
    /// that may contain blocks, so the result stays valid HTML. A fragment
    /// with a link splits any link around the cursor the same way, since
    /// links cannot nest. The cursor
    /// ends up after the inserted content. Without a cursor the fragment is
    /// appended to the document.
    pub(crate) fn insert_fragment(&mut self, fragment: &Dom) {
        let nodes = fragment.children(fragment.document()).to_vec();
        let Some(selection) = self.selection else {
            let document = self.dom.document();
            for node in nodes {
                let copy = self.dom.import_subtree(fragment, node);
                self.dom.append_child(document, copy);
            }
            return;
        };

        let offset = selection.start();
        self.delete_range(offset, selection.end());
        self.selection = Some(Selection::cursor(offset));
        if nodes.is_empty() {
            return;
        }

        let point = self.segments().insertion_point(offset);
        let boundary = boundary_for(&mut self.dom, point);
        let block_stop = has_blocks(fragment).then(|| self.block_container(boundary.parent));
        let link_stop = if has_links(fragment) {
            self.enclosing_link(boundary.parent)
                .and_then(|link| self.dom.parent(link))
        } else {
            None
        };
        let stop = match (block_stop, link_stop) {
            (Some(block), Some(link)) if self.dom.is_ancestor_of(link, block) => Some(link),
            (Some(block), _) => Some(block),
            (None, link) => link,
        };
        let (boundary, halves) = match stop {
            Some(stop) => split_up_to(&mut self.dom, boundary, stop),
            None => (boundary, Vec::new()),
        };

        let Boundary { parent, index } = boundary;
        let mut inserted = Vec::with_capacity(nodes.len());
        for (i, node) in nodes.into_iter().enumerate() {
            let copy = self.dom.import_subtree(fragment, node);
            self.dom.insert_child(parent, index + i, copy);
            inserted.push(copy);
        }

        for (left, right) in halves {
            for half in [left, right] {
                if self.dom.is_attached(half) && !self.dom.has_content(half) {
                    self.dom.detach(half);
                }
            }
        }

        let end = self
            .segments()
            .segments()
            .iter()
            .filter(|s| {
                inserted
                    .iter()
                    .any(|h| *h == s.node || self.dom.is_ancestor_of(*h, s.node))
            })
            .map(|s| s.end)
            .max()
            .unwrap_or(offset);
        self.selection = Some(Selection::cursor(end));
    }

    /// The nearest ancestor-or-self of `handle` that may hold blocks.
    fn block_container(&self, handle: DomHandle) -> DomHandle {
        std::iter::once(handle)
            .chain(self.dom.ancestors(handle))
            .find(|h| {
                *h == self.dom.document()
                    || self.dom.tag(*h).map(can_contain_blocks).unwrap_or(false)
            })
            .unwrap_or_else(|| self.dom.document())
    }

    fn enclosing_link(&self, handle: DomHandle) -> Option<DomHandle> {
        std::iter::once(handle)
            .chain(self.dom.ancestors(handle))
            .find(|h| self.dom.has_tag(*h, "a"))
    }
}

fn has_blocks(fragment: &Dom) -> bool {
    fragment
        .descendants(fragment.document())
        .into_iter()
        .any(|h| fragment.tag(h).map(is_block_tag).unwrap_or(false))
}

fn has_links(fragment: &Dom) -> bool {
    fragment
        .descendants(fragment.document())
        .into_iter()
        .any(|h| fragment.has_tag(h, "a"))
}
