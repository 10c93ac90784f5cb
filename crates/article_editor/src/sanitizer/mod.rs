// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Paste normalization: clipboard clean-up, the whitelist and the pass that
//! rewrites a fragment against it.

pub mod clipboard;
pub mod normalizer;
pub(crate) mod url_policy;
pub mod whitelist;

pub use clipboard::{preprocess_clipboard_html, ClipboardSource};
pub use normalizer::{normalize, normalize_dom, normalize_fragment};
pub use whitelist::{AllowedTag, TagFamily, DEFAULT_TEXT_CLASS};
