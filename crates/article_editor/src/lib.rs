// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Editing engine for article bodies.
//!
//! An [`EditorModel`] owns an [`EditingSurface`] (an arena HTML tree plus a
//! selection measured in UTF-16 code units) and changes it through typed
//! [`EditorCommand`]s, typing operations and paste. Pasted markup goes
//! through the [`sanitizer`], which keeps a whitelisted subset of HTML with
//! canonical classes. [`ContentSync`] connects a model to the host's copy of
//! the document.

mod command_error;
pub mod commands;
mod config;
mod content_sync;
pub mod dom;
mod editor_model;
mod editor_update;
mod formats;
mod links;
mod list_type;
mod location;
pub mod sanitizer;
mod state;
mod state_query;
mod surface;

pub use crate::command_error::{CommandError, StateError};
pub use crate::commands::{EditorCommand, FormatCommand, HistoryOp, InsertCommand};
pub use crate::config::EditorConfig;
pub use crate::content_sync::ContentSync;
pub use crate::dom::{Dom, DomHandle};
pub use crate::editor_model::EditorModel;
pub use crate::editor_update::{ContentUpdate, EditorUpdate};
pub use crate::formats::{InlineFormat, StyleProperty};
pub use crate::links::{normalize_link_url, ImageRequest, LinkRequest};
pub use crate::list_type::ListType;
pub use crate::location::{Location, Selection};
pub use crate::sanitizer::{normalize, ClipboardSource};
pub use crate::state::{Alignment, BlockFormat, EditorState};
pub use crate::surface::EditingSurface;
