// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumIter};

use crate::dom::nodes::ElementNode;
use crate::dom::style::InlineStyle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl InlineFormat {
    /// The element added when the format is switched on.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bold => "strong",
            Self::Italic => "em",
            Self::Underline => "u",
            Self::Strikethrough => "s",
        }
    }

    /// Every element that applies this format.
    pub(crate) fn tags(&self) -> &'static [&'static str] {
        match self {
            Self::Bold => &["strong", "b"],
            Self::Italic => &["em", "i"],
            Self::Underline => &["u"],
            Self::Strikethrough => &["s", "strike", "del"],
        }
    }

    /// Whether an inline style declaration applies this format.
    pub(crate) fn is_declared_by(&self, style: &InlineStyle) -> bool {
        match self {
            Self::Bold => ["bold", "bolder", "600", "700", "800", "900"]
                .iter()
                .any(|v| style.has("font-weight", v)),
            Self::Italic => {
                style.has("font-style", "italic") || style.has("font-style", "oblique")
            }
            Self::Underline => has_decoration(style, "underline"),
            Self::Strikethrough => has_decoration(style, "line-through"),
        }
    }

    fn remove_declaration(&self, style: &mut InlineStyle) {
        match self {
            Self::Bold => style.remove("font-weight"),
            Self::Italic => style.remove("font-style"),
            Self::Underline | Self::Strikethrough => {
                let token = if *self == Self::Underline {
                    "underline"
                } else {
                    "line-through"
                };
                style.remove_token("text-decoration", token);
                style.remove_token("text-decoration-line", token);
            }
        }
    }

    /// Whether `element` applies this format, by its tag or its style.
    pub(crate) fn applied_by(&self, element: &ElementNode) -> bool {
        self.tags().contains(&element.tag())
            || element
                .get_attr("style")
                .map(|s| self.is_declared_by(&InlineStyle::parse(s)))
                .unwrap_or(false)
    }

    /// Strip this format from a stack of enclosing elements. Elements
    /// named after the format go; styles lose the matching declaration and
    /// spans left without attributes go too.
    pub(crate) fn remove_from(&self, marks: &mut Vec<ElementNode>) {
        marks.retain(|m| !self.tags().contains(&m.tag()));
        for mark in marks.iter_mut() {
            let Some(style) = mark.get_attr("style") else {
                continue;
            };
            let mut style = InlineStyle::parse(style);
            self.remove_declaration(&mut style);
            if style.is_empty() {
                mark.remove_attr("style");
            } else {
                mark.set_attr("style", style.to_string());
            }
        }
        marks.retain(|m| m.tag() != "span" || !m.attrs().is_empty());
    }
}

fn has_decoration(style: &InlineStyle, value: &str) -> bool {
    style.has_token("text-decoration", value)
        || style.has_token("text-decoration-line", value)
}

/// Character-level style properties set through a `span`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    FontSize,
    FontFamily,
    ForeColor,
    BackColor,
}

impl StyleProperty {
    pub fn css_name(&self) -> &'static str {
        match self {
            Self::FontSize => "font-size",
            Self::FontFamily => "font-family",
            Self::ForeColor => "color",
            Self::BackColor => "background-color",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn marks(tags: &[(&str, &str)]) -> Vec<ElementNode> {
        tags.iter()
            .map(|(tag, style)| {
                if style.is_empty() {
                    ElementNode::new(tag)
                } else {
                    ElementNode::with_attrs(tag, vec![("style".into(), (*style).into())])
                }
            })
            .collect()
    }

    #[test]
    fn synonyms_and_styles_apply_formats() {
        assert!(InlineFormat::Bold.applied_by(&ElementNode::new("b")));
        assert!(InlineFormat::Strikethrough.applied_by(&ElementNode::new("del")));
        let span = ElementNode::with_attrs(
            "span",
            vec![("style".into(), "font-weight: 700".into())],
        );
        assert!(InlineFormat::Bold.applied_by(&span));
        assert!(!InlineFormat::Italic.applied_by(&span));
    }

    #[test]
    fn removing_bold_strips_tags_and_declarations() {
        let mut stack = marks(&[
            ("b", ""),
            ("span", "font-weight: bold"),
            ("span", "font-weight: bold; color: red"),
            ("em", ""),
        ]);
        InlineFormat::Bold.remove_from(&mut stack);
        let tags: Vec<&str> = stack.iter().map(|m| m.tag()).collect();
        assert_eq!(tags, vec!["span", "em"]);
        assert_eq!(stack[0].get_attr("style"), Some("color: red;"));
    }
}
