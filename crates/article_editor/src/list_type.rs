// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter)]
pub enum ListType {
    #[strum(serialize = "ul")]
    Unordered,
    #[strum(serialize = "ol")]
    Ordered,
}

impl ListType {
    /// The element that holds items of this list type.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ul" => Some(Self::Unordered),
            "ol" => Some(Self::Ordered),
            _ => None,
        }
    }
}
