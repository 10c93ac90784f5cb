// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

/// Index of a node inside a [`crate::Dom`] arena.
///
/// Handles stay valid for the lifetime of the arena they came from: nodes
/// are detached rather than removed, so a handle never starts pointing at a
/// different node. Handles from one `Dom` are meaningless in another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomHandle(pub(crate) usize);

impl DomHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}
