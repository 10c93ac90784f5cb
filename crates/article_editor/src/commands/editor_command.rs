// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::links::{ImageRequest, LinkRequest};
use crate::state::{Alignment, BlockFormat};
use crate::{CommandError, InlineFormat, ListType};

static CSS_LENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(\.\d+)?(px|pt|em|rem|%)$").expect("valid regex")
});

static COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^(
            \#([0-9a-f]{3}|[0-9a-f]{4}|[0-9a-f]{6}|[0-9a-f]{8})
            | (rgb|rgba|hsl|hsla)\(\s*[0-9.%\s,/+-]+\)
            | [a-z]+
        )$",
    )
    .expect("valid regex")
});

static FONT_FAMILY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[\w\s,'"-]+$"#).expect("valid regex"));

/// Keywords for the legacy `fontSize` values 1 to 7.
const FONT_SIZE_KEYWORDS: [&str; 7] = [
    "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large",
];

/// Everything the toolbar can ask the editor to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorCommand {
    Format(FormatCommand),
    Insert(InsertCommand),
    History(HistoryOp),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatCommand {
    Inline(InlineFormat),
    Block(BlockFormat),
    List(ListType),
    Indent,
    Outdent,
    Align(Alignment),
    RemoveFormat,
    Unlink,
    FontSize(String),
    FontFamily(String),
    ForeColor(String),
    BackColor(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertCommand {
    Link(LinkRequest),
    Image(ImageRequest),
    /// Markup that goes through the paste normalizer first.
    Html(String),
    Text(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryOp {
    Undo,
    Redo,
}

/// Command names accepted by [`EditorCommand::parse`], including the names
/// browsers use for `execCommand`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(ascii_case_insensitive)]
enum CommandName {
    #[strum(serialize = "bold")]
    Bold,
    #[strum(serialize = "italic")]
    Italic,
    #[strum(serialize = "underline")]
    Underline,
    #[strum(to_string = "strikeThrough", serialize = "strike")]
    StrikeThrough,
    #[strum(to_string = "formatBlock", serialize = "heading")]
    FormatBlock,
    #[strum(to_string = "insertUnorderedList", serialize = "unorderedList")]
    InsertUnorderedList,
    #[strum(to_string = "insertOrderedList", serialize = "orderedList")]
    InsertOrderedList,
    #[strum(serialize = "indent")]
    Indent,
    #[strum(serialize = "outdent")]
    Outdent,
    #[strum(to_string = "justifyLeft", serialize = "alignLeft")]
    JustifyLeft,
    #[strum(to_string = "justifyCenter", serialize = "alignCenter")]
    JustifyCenter,
    #[strum(to_string = "justifyRight", serialize = "alignRight")]
    JustifyRight,
    #[strum(to_string = "justifyFull", serialize = "alignJustify")]
    JustifyFull,
    #[strum(serialize = "removeFormat")]
    RemoveFormat,
    #[strum(serialize = "unlink")]
    Unlink,
    #[strum(serialize = "fontSize")]
    FontSize,
    #[strum(to_string = "fontName", serialize = "fontFamily")]
    FontName,
    #[strum(serialize = "foreColor")]
    ForeColor,
    #[strum(to_string = "backColor", serialize = "hiliteColor")]
    BackColor,
    #[strum(to_string = "createLink", serialize = "link")]
    CreateLink,
    #[strum(to_string = "insertImage", serialize = "image")]
    InsertImage,
    #[strum(serialize = "insertHTML")]
    InsertHtml,
    #[strum(serialize = "insertText")]
    InsertText,
    #[strum(serialize = "undo")]
    Undo,
    #[strum(serialize = "redo")]
    Redo,
}

impl EditorCommand {
    /// Build a command from its toolbar name and optional value.
    pub fn parse(name: &str, value: Option<&str>) -> Result<Self, CommandError> {
        let command = CommandName::from_str(name.trim())
            .map_err(|_| CommandError::UnknownCommand(name.to_owned()))?;
        let required = || {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CommandError::MissingValue(command.to_string()))
        };
        let raw = || value.ok_or_else(|| CommandError::MissingValue(command.to_string()));
        let invalid = |v: &str| CommandError::InvalidValue {
            command: command.to_string(),
            value: v.to_owned(),
        };
        let checked = |v: &str, pattern: &Regex| {
            if pattern.is_match(v) {
                Ok(v.to_owned())
            } else {
                Err(invalid(v))
            }
        };

        use FormatCommand as F;
        let format = |f: FormatCommand| -> Result<Self, CommandError> { Ok(Self::Format(f)) };
        match command {
            CommandName::Bold => format(F::Inline(InlineFormat::Bold)),
            CommandName::Italic => format(F::Inline(InlineFormat::Italic)),
            CommandName::Underline => format(F::Inline(InlineFormat::Underline)),
            CommandName::StrikeThrough => format(F::Inline(InlineFormat::Strikethrough)),
            CommandName::FormatBlock => {
                let v = required()?;
                let block = BlockFormat::from_value(v).ok_or_else(|| invalid(v))?;
                format(F::Block(block))
            }
            CommandName::InsertUnorderedList => format(F::List(ListType::Unordered)),
            CommandName::InsertOrderedList => format(F::List(ListType::Ordered)),
            CommandName::Indent => format(F::Indent),
            CommandName::Outdent => format(F::Outdent),
            CommandName::JustifyLeft => format(F::Align(Alignment::Left)),
            CommandName::JustifyCenter => format(F::Align(Alignment::Center)),
            CommandName::JustifyRight => format(F::Align(Alignment::Right)),
            CommandName::JustifyFull => format(F::Align(Alignment::Justify)),
            CommandName::RemoveFormat => format(F::RemoveFormat),
            CommandName::Unlink => format(F::Unlink),
            CommandName::FontSize => {
                let v = required()?;
                let size = font_size_value(v).ok_or_else(|| invalid(v))?;
                format(F::FontSize(size))
            }
            CommandName::FontName => format(F::FontFamily(checked(required()?, &*FONT_FAMILY)?)),
            CommandName::ForeColor => format(F::ForeColor(checked(required()?, &*COLOR)?)),
            CommandName::BackColor => format(F::BackColor(checked(required()?, &*COLOR)?)),
            CommandName::CreateLink => {
                Ok(Self::Insert(InsertCommand::Link(LinkRequest::new(required()?))))
            }
            CommandName::InsertImage => {
                Ok(Self::Insert(InsertCommand::Image(ImageRequest::new(required()?))))
            }
            CommandName::InsertHtml => Ok(Self::Insert(InsertCommand::Html(raw()?.to_owned()))),
            CommandName::InsertText => Ok(Self::Insert(InsertCommand::Text(raw()?.to_owned()))),
            CommandName::Undo => Ok(Self::History(HistoryOp::Undo)),
            CommandName::Redo => Ok(Self::History(HistoryOp::Redo)),
        }
    }

    /// A short name for log messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Format(format) => match format {
                FormatCommand::Inline(InlineFormat::Bold) => "bold",
                FormatCommand::Inline(InlineFormat::Italic) => "italic",
                FormatCommand::Inline(InlineFormat::Underline) => "underline",
                FormatCommand::Inline(InlineFormat::Strikethrough) => "strikeThrough",
                FormatCommand::Block(_) => "formatBlock",
                FormatCommand::List(ListType::Unordered) => "insertUnorderedList",
                FormatCommand::List(ListType::Ordered) => "insertOrderedList",
                FormatCommand::Indent => "indent",
                FormatCommand::Outdent => "outdent",
                FormatCommand::Align(_) => "align",
                FormatCommand::RemoveFormat => "removeFormat",
                FormatCommand::Unlink => "unlink",
                FormatCommand::FontSize(_) => "fontSize",
                FormatCommand::FontFamily(_) => "fontName",
                FormatCommand::ForeColor(_) => "foreColor",
                FormatCommand::BackColor(_) => "backColor",
            },
            Self::Insert(insert) => match insert {
                InsertCommand::Link(_) => "createLink",
                InsertCommand::Image(_) => "insertImage",
                InsertCommand::Html(_) => "insertHTML",
                InsertCommand::Text(_) => "insertText",
            },
            Self::History(HistoryOp::Undo) => "undo",
            Self::History(HistoryOp::Redo) => "redo",
        }
    }
}

fn font_size_value(value: &str) -> Option<String> {
    if let Ok(legacy) = value.parse::<usize>() {
        return legacy
            .checked_sub(1)
            .and_then(|i| FONT_SIZE_KEYWORDS.get(i))
            .map(|k| (*k).to_owned());
    }
    if FONT_SIZE_KEYWORDS.contains(&value) || CSS_LENGTH.is_match(value) {
        return Some(value.to_owned());
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(name: &str, value: Option<&str>) -> Result<EditorCommand, CommandError> {
        EditorCommand::parse(name, value)
    }

    #[test]
    fn browser_names_are_accepted_in_any_case() {
        assert_eq!(
            parse("BOLD", None),
            Ok(EditorCommand::Format(FormatCommand::Inline(InlineFormat::Bold)))
        );
        assert_eq!(
            parse("strikethrough", None),
            Ok(EditorCommand::Format(FormatCommand::Inline(
                InlineFormat::Strikethrough
            )))
        );
        assert_eq!(
            parse("insertunorderedlist", None),
            Ok(EditorCommand::Format(FormatCommand::List(ListType::Unordered)))
        );
        assert_eq!(
            parse("hiliteColor", Some("yellow")),
            Ok(EditorCommand::Format(FormatCommand::BackColor("yellow".into())))
        );
        assert_eq!(
            parse("justifyFull", None),
            Ok(EditorCommand::Format(FormatCommand::Align(Alignment::Justify)))
        );
        assert_eq!(parse("redo", None), Ok(EditorCommand::History(HistoryOp::Redo)));
    }

    #[test]
    fn format_block_values_are_parsed() {
        assert_eq!(
            parse("formatBlock", Some("<H2>")),
            Ok(EditorCommand::Format(FormatCommand::Block(BlockFormat::Heading(2))))
        );
        assert_eq!(
            parse("formatBlock", Some("marquee")),
            Err(CommandError::InvalidValue {
                command: "formatBlock".into(),
                value: "marquee".into()
            })
        );
    }

    #[test]
    fn legacy_font_sizes_become_keywords() {
        assert_eq!(
            parse("fontSize", Some("5")),
            Ok(EditorCommand::Format(FormatCommand::FontSize("x-large".into())))
        );
        assert_eq!(
            parse("fontSize", Some("18px")),
            Ok(EditorCommand::Format(FormatCommand::FontSize("18px".into())))
        );
        assert!(parse("fontSize", Some("0")).is_err());
        assert!(parse("fontSize", Some("8")).is_err());
        assert!(parse("fontSize", Some("1px; color: red")).is_err());
    }

    #[test]
    fn colours_and_fonts_are_validated() {
        assert!(parse("foreColor", Some("#ff0000")).is_ok());
        assert!(parse("foreColor", Some("rgb(1, 2, 3)")).is_ok());
        assert!(parse("foreColor", Some("red; background: url(x)")).is_err());
        assert!(parse("fontName", Some("Georgia, 'Times New Roman', serif")).is_ok());
        assert!(parse("fontName", Some("x; color: red")).is_err());
    }

    #[test]
    fn values_are_required_where_needed() {
        assert_eq!(
            parse("createLink", None),
            Err(CommandError::MissingValue("createLink".into()))
        );
        assert_eq!(
            parse("fontSize", Some("  ")),
            Err(CommandError::MissingValue("fontSize".into()))
        );
        assert_eq!(
            parse("insertText", Some(" ")),
            Ok(EditorCommand::Insert(InsertCommand::Text(" ".into())))
        );
    }

    #[test]
    fn unknown_names_are_reported() {
        assert_eq!(
            parse("selectAll", None),
            Err(CommandError::UnknownCommand("selectAll".into()))
        );
    }

    #[test]
    fn labels_match_browser_names() {
        let command = parse("link", Some("https://x.org")).unwrap();
        assert_eq!(command.label(), "createLink");
    }
}
