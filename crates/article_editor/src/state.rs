// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::dom::tags::heading_level;
use crate::{InlineFormat, ListType};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// The `text-align` value written for this alignment.
    pub fn css_value(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }

    pub(crate) fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Self::Left),
            "center" | "-webkit-center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// The kind of block the selection is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockFormat {
    #[default]
    Paragraph,
    Heading(u8),
    Quote,
    CodeBlock,
    /// Any other container, such as a table cell. Cannot be applied.
    Other,
}

impl BlockFormat {
    /// Parse a `formatBlock` value: a tag name, optionally in angle
    /// brackets, in any case.
    pub fn from_value(value: &str) -> Option<Self> {
        let tag = value
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim()
            .to_ascii_lowercase();
        match tag.as_str() {
            "p" => Some(Self::Paragraph),
            "blockquote" => Some(Self::Quote),
            "pre" => Some(Self::CodeBlock),
            other => heading_level(other).map(Self::Heading),
        }
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Paragraph => Some("p"),
            Self::Heading(1) => Some("h1"),
            Self::Heading(2) => Some("h2"),
            Self::Heading(3) => Some("h3"),
            Self::Heading(4) => Some("h4"),
            Self::Heading(5) => Some("h5"),
            Self::Heading(6) => Some("h6"),
            Self::Heading(_) => None,
            Self::Quote => Some("blockquote"),
            Self::CodeBlock => Some("pre"),
            Self::Other => None,
        }
    }
}

/// What the toolbar shows for the current selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditorState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    /// `None` when the size is inherited.
    pub font_size: Option<String>,
    pub font_family: Option<String>,
    pub alignment: Alignment,
    pub list_type: Option<ListType>,
    pub block_format: BlockFormat,
    /// The target of the link the selection starts in.
    pub link_url: Option<String>,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl EditorState {
    pub fn is_active(&self, format: InlineFormat) -> bool {
        match format {
            InlineFormat::Bold => self.bold,
            InlineFormat::Italic => self.italic,
            InlineFormat::Underline => self.underline,
            InlineFormat::Strikethrough => self.strikethrough,
        }
    }

    pub(crate) fn set_active(&mut self, format: InlineFormat, active: bool) {
        match format {
            InlineFormat::Bold => self.bold = active,
            InlineFormat::Italic => self.italic = active,
            InlineFormat::Underline => self.underline = active,
            InlineFormat::Strikethrough => self.strikethrough = active,
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn block_format_values_accept_several_spellings() {
        assert_eq!(BlockFormat::from_value("h2"), Some(BlockFormat::Heading(2)));
        assert_eq!(BlockFormat::from_value("H2"), Some(BlockFormat::Heading(2)));
        assert_eq!(BlockFormat::from_value("<h2>"), Some(BlockFormat::Heading(2)));
        assert_eq!(BlockFormat::from_value("<P>"), Some(BlockFormat::Paragraph));
        assert_eq!(BlockFormat::from_value("blockquote"), Some(BlockFormat::Quote));
        assert_eq!(BlockFormat::from_value("pre"), Some(BlockFormat::CodeBlock));
        assert_eq!(BlockFormat::from_value("h7"), None);
        assert_eq!(BlockFormat::from_value("div"), None);
    }

    #[test]
    fn block_formats_map_to_tags() {
        assert_eq!(BlockFormat::Heading(3).tag(), Some("h3"));
        assert_eq!(BlockFormat::Heading(9).tag(), None);
        assert_eq!(BlockFormat::Other.tag(), None);
    }

    #[test]
    fn alignments_parse_from_css_and_names() {
        assert_eq!(Alignment::from_css("start"), Some(Alignment::Left));
        assert_eq!(Alignment::from_css(" Center "), Some(Alignment::Center));
        assert_eq!(Alignment::from_css("inherit"), None);
        assert_eq!(Alignment::from_str("JUSTIFY"), Ok(Alignment::Justify));
        assert_eq!(Alignment::Right.to_string(), "right");
    }

    #[test]
    fn flags_can_be_read_by_format() {
        let mut state = EditorState::default();
        state.set_active(InlineFormat::Underline, true);
        assert!(state.is_active(InlineFormat::Underline));
        assert!(!state.is_active(InlineFormat::Bold));
    }
}
