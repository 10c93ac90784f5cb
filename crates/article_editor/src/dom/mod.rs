// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

pub mod dom_handle;
pub mod dom_struct;
pub mod nodes;
pub mod parser;
pub(crate) mod style;
pub(crate) mod tags;
pub mod to_html;

pub use dom_handle::DomHandle;
pub use dom_struct::Dom;
pub use nodes::{html_name, ElementNode, NodeData};
pub use parser::parse;
