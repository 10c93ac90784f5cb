// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

pub mod dispatcher;
pub mod editor_command;
pub(crate) mod history;

pub use editor_command::{EditorCommand, FormatCommand, HistoryOp, InsertCommand};
