// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The fixed set of elements the paste normalizer may emit, with the single
//! class string each one carries.

use std::str::FromStr;

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A tag the normalizer keeps. Parsing accepts the legacy synonyms
/// (`b`, `i`, `strike`, `del`) and yields the canonical variant, whose
/// `Display` is the tag that is emitted.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum AllowedTag {
    #[strum(serialize = "h1")]
    H1,
    #[strum(serialize = "h2")]
    H2,
    #[strum(serialize = "h3")]
    H3,
    #[strum(serialize = "h4")]
    H4,
    #[strum(serialize = "h5")]
    H5,
    #[strum(serialize = "h6")]
    H6,
    #[strum(to_string = "strong", serialize = "b")]
    Strong,
    #[strum(to_string = "em", serialize = "i")]
    Em,
    #[strum(serialize = "u")]
    U,
    #[strum(to_string = "s", serialize = "strike", serialize = "del")]
    S,
    #[strum(serialize = "p")]
    P,
    #[strum(serialize = "div")]
    Div,
    #[strum(serialize = "ul")]
    Ul,
    #[strum(serialize = "ol")]
    Ol,
    #[strum(serialize = "li")]
    Li,
    #[strum(serialize = "a")]
    A,
    #[strum(serialize = "code")]
    Code,
    #[strum(serialize = "pre")]
    Pre,
    #[strum(serialize = "blockquote")]
    Blockquote,
    #[strum(serialize = "table")]
    Table,
    #[strum(serialize = "caption")]
    Caption,
    #[strum(serialize = "thead")]
    Thead,
    #[strum(serialize = "tbody")]
    Tbody,
    #[strum(serialize = "tfoot")]
    Tfoot,
    #[strum(serialize = "tr")]
    Tr,
    #[strum(serialize = "th")]
    Th,
    #[strum(serialize = "td")]
    Td,
    #[strum(serialize = "span")]
    Span,
    #[strum(serialize = "br")]
    Br,
    #[strum(serialize = "img")]
    Img,
}

/// Groups of tags that play the same role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagFamily {
    Heading,
    Emphasis,
    BlockStructure,
    Hyperlink,
    Code,
    Quote,
    Table,
    Text,
    Break,
    Image,
}

/// Class given to the span that replaces an unknown element.
pub const DEFAULT_TEXT_CLASS: &str = "text-base";

impl AllowedTag {
    /// Look up a tag name, mapping synonyms to their canonical tag.
    pub fn lookup(tag: &str) -> Option<Self> {
        Self::from_str(tag).ok()
    }

    pub fn family(&self) -> TagFamily {
        match self {
            Self::H1 | Self::H2 | Self::H3 | Self::H4 | Self::H5 | Self::H6 => {
                TagFamily::Heading
            }
            Self::Strong | Self::Em | Self::U | Self::S => TagFamily::Emphasis,
            Self::P | Self::Div | Self::Ul | Self::Ol | Self::Li => {
                TagFamily::BlockStructure
            }
            Self::A => TagFamily::Hyperlink,
            Self::Code | Self::Pre => TagFamily::Code,
            Self::Blockquote => TagFamily::Quote,
            Self::Table
            | Self::Caption
            | Self::Thead
            | Self::Tbody
            | Self::Tfoot
            | Self::Tr
            | Self::Th
            | Self::Td => TagFamily::Table,
            Self::Span => TagFamily::Text,
            Self::Br => TagFamily::Break,
            Self::Img => TagFamily::Image,
        }
    }

    /// The class string every emitted element of this tag carries. Empty
    /// means no `class` attribute at all.
    pub fn canonical_class(&self) -> &'static str {
        match self {
            Self::H1 => "text-4xl font-bold tracking-tight mt-8 mb-4",
            Self::H2 => "text-3xl font-bold tracking-tight mt-8 mb-4",
            Self::H3 => "text-2xl font-semibold mt-6 mb-3",
            Self::H4 => "text-xl font-semibold mt-6 mb-3",
            Self::H5 => "text-lg font-semibold mt-4 mb-2",
            Self::H6 => "text-base font-semibold uppercase mt-4 mb-2",
            Self::Strong => "font-bold",
            Self::Em => "italic",
            Self::U => "underline",
            Self::S => "line-through",
            Self::P => "my-4 leading-7",
            Self::Div => "my-2",
            Self::Ul => "list-disc pl-6 my-4",
            Self::Ol => "list-decimal pl-6 my-4",
            Self::Li => "my-1",
            Self::A => "text-blue-600 underline hover:text-blue-800",
            Self::Code => "rounded bg-gray-100 px-1 py-0.5 font-mono text-sm",
            Self::Pre => {
                "rounded-lg bg-gray-900 text-gray-100 p-4 my-4 overflow-x-auto font-mono text-sm"
            }
            Self::Blockquote => {
                "border-l-4 border-gray-300 pl-4 my-4 italic text-gray-700"
            }
            Self::Table => "w-full border-collapse my-4",
            Self::Caption => "text-sm text-gray-600 my-2",
            Self::Thead => "bg-gray-100",
            Self::Tbody => "divide-y divide-gray-200",
            Self::Tfoot => "bg-gray-50",
            Self::Tr => "border-b border-gray-200",
            Self::Th => "px-4 py-2 text-left font-semibold",
            Self::Td => "px-4 py-2",
            Self::Span => DEFAULT_TEXT_CLASS,
            Self::Br => "",
            Self::Img => "max-w-full h-auto rounded my-4",
        }
    }

    /// Source attributes this tag may keep. `class` is never in the list:
    /// it is always replaced by [`AllowedTag::canonical_class`].
    pub fn allowed_attributes(&self) -> &'static [&'static str] {
        match self {
            Self::A => &["href", "title"],
            Self::Img => &["src", "alt", "title"],
            Self::Br => &[],
            _ => &["title"],
        }
    }
}
