// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use thiserror::Error;

/// Why a command did not change the surface.
///
/// These never reach the caller of the dispatcher: they are logged and the
/// surface is left as it was.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("command `{0}` needs a value")]
    MissingValue(String),
    #[error("`{value}` is not a valid value for `{command}`")]
    InvalidValue { command: String, value: String },
    #[error("there is no cursor in the editing surface")]
    NoSelection,
    #[error("the URL is empty")]
    EmptyUrl,
    #[error("the URL `{0}` uses a scheme that is not allowed")]
    DisallowedUrl(String),
}

impl CommandError {
    /// Errors that describe an expected no-op rather than a failure.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NoSelection | Self::EmptyUrl)
    }
}

/// Why the selection could not be inspected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("there is no cursor in the editing surface")]
    NoSelection,
    #[error("offset {offset} is beyond the end of the document ({len})")]
    StaleSelection { offset: usize, len: usize },
}
