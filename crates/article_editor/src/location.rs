// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

/// A position in the flattened text of the surface, in UTF-16 code units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location(usize);

impl Location {
    pub fn offset(&self) -> usize {
        self.0
    }
}

impl From<usize> for Location {
    fn from(offset: usize) -> Self {
        Self(offset)
    }
}

impl From<Location> for usize {
    fn from(location: Location) -> Self {
        location.0
    }
}

/// A cursor (`anchor == focus`) or a range selection. The focus may come
/// before the anchor when the user selected backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Location,
    pub focus: Location,
}

impl Selection {
    pub fn new(anchor: impl Into<Location>, focus: impl Into<Location>) -> Self {
        Self {
            anchor: anchor.into(),
            focus: focus.into(),
        }
    }

    pub fn cursor(at: impl Into<Location>) -> Self {
        let at = at.into();
        Self {
            anchor: at,
            focus: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.focus).offset()
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.focus).offset()
    }

    pub(crate) fn clamped(&self, len: usize) -> Self {
        Self::new(self.anchor.offset().min(len), self.focus.offset().min(len))
    }
}
