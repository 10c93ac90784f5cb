// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

mod dom_creator;

use dom_creator::DomCreator;

use super::Dom;

/// Parse an HTML fragment as if it were the content of a `<body>`.
///
/// Any string is accepted; malformed markup is repaired the way a browser
/// would repair it.
pub fn parse(html: &str) -> Dom {
    DomCreator::parse(html)
}
