// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::{EditorState, Selection};

/// Whether the host has to re-render the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentUpdate {
    Keep,
    ReplaceAll { html: String },
}

/// What changed after an operation on the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorUpdate {
    pub content: ContentUpdate,
    pub selection: Option<Selection>,
    pub state: EditorState,
}

impl EditorUpdate {
    pub(crate) fn keep(selection: Option<Selection>, state: EditorState) -> Self {
        Self {
            content: ContentUpdate::Keep,
            selection,
            state,
        }
    }

    pub(crate) fn replace_all(
        html: String,
        selection: Option<Selection>,
        state: EditorState,
    ) -> Self {
        Self {
            content: ContentUpdate::ReplaceAll { html },
            selection,
            state,
        }
    }

    /// The new document, if it changed.
    pub fn html(&self) -> Option<&str> {
        match &self.content {
            ContentUpdate::Keep => None,
            ContentUpdate::ReplaceAll { html } => Some(html),
        }
    }

    pub fn is_content_changed(&self) -> bool {
        self.html().is_some()
    }
}
