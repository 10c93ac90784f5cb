// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Undo and redo by whole-surface snapshots.
//!
//! Before each change that alters the serialization, the previous surface
//! (tree and selection) is pushed on the undo stack. Undoing swaps the
//! current surface for the top of that stack and keeps the current one for
//! redo.

use crate::EditingSurface;

#[derive(Clone, Debug)]
pub(crate) struct History {
    undo_stack: Vec<EditingSurface>,
    redo_stack: Vec<EditingSurface>,
    limit: usize,
}

impl History {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Record the surface as it was before a change. Starts a new branch,
    /// so anything that could be redone is forgotten.
    pub(crate) fn push(&mut self, before: EditingSurface) {
        self.redo_stack.clear();
        if self.limit == 0 {
            return;
        }
        if self.undo_stack.len() == self.limit {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(before);
    }

    pub(crate) fn undo(&mut self, current: &EditingSurface) -> Option<EditingSurface> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    pub(crate) fn redo(&mut self, current: &EditingSurface) -> Option<EditingSurface> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(next)
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    #[cfg(test)]
    pub(crate) fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
}
