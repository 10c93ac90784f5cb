// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::fmt;

/// The declarations of an inline `style` attribute, in source order.
///
/// Property names are lower-cased; values are kept as written (trimmed).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub(crate) fn parse(style: &str) -> Self {
        let declarations = style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .map(|(prop, value)| {
                (prop.trim().to_ascii_lowercase(), value.trim().to_owned())
            })
            .filter(|(prop, value)| !prop.is_empty() && !value.is_empty())
            .collect();
        Self { declarations }
    }

    pub(crate) fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `property` is set to `value`, ignoring case and any
    /// `!important` suffix.
    pub(crate) fn has(&self, property: &str, value: &str) -> bool {
        self.get(property)
            .map(|v| {
                v.trim_end_matches("!important")
                    .trim()
                    .eq_ignore_ascii_case(value)
            })
            .unwrap_or(false)
    }

    /// Whether any whitespace-separated token of `property` equals `value`,
    /// e.g. `text-decoration: underline line-through`.
    pub(crate) fn has_token(&self, property: &str, value: &str) -> bool {
        self.get(property)
            .map(|v| {
                v.split_whitespace().any(|t| t.eq_ignore_ascii_case(value))
            })
            .unwrap_or(false)
    }

    pub(crate) fn set(&mut self, property: &str, value: &str) {
        let property = property.to_ascii_lowercase();
        self.declarations.retain(|(p, _)| *p != property);
        self.declarations.push((property, value.to_owned()));
    }

    pub(crate) fn remove(&mut self, property: &str) {
        self.declarations.retain(|(p, _)| p != property);
    }

    /// Remove one whitespace-separated token from a property's value,
    /// dropping the property when nothing is left.
    pub(crate) fn remove_token(&mut self, property: &str, token: &str) {
        let Some(value) = self.get(property) else {
            return;
        };
        let remaining: Vec<&str> = value
            .split_whitespace()
            .filter(|t| !t.eq_ignore_ascii_case(token))
            .collect();
        if remaining.is_empty() {
            self.remove(property);
        } else {
            let remaining = remaining.join(" ");
            self.set(property, &remaining);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (prop, value) in &self.declarations {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{prop}: {value};")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_declarations_and_ignores_garbage() {
        let style = InlineStyle::parse("Font-Weight:700; ;color : red;junk");
        assert_eq!(style.get("font-weight"), Some("700"));
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("junk"), None);
    }

    #[test]
    fn has_ignores_case_and_important() {
        let style = InlineStyle::parse("font-style: ITALIC !important");
        assert!(style.has("font-style", "italic"));
        assert!(!style.has("font-weight", "bold"));
    }

    #[test]
    fn has_token_matches_one_of_several_values() {
        let style =
            InlineStyle::parse("text-decoration: underline line-through");
        assert!(style.has_token("text-decoration", "line-through"));
        assert!(style.has_token("text-decoration", "underline"));
        assert!(!style.has_token("text-decoration", "overline"));
    }

    #[test]
    fn remove_token_keeps_other_decorations() {
        let mut style =
            InlineStyle::parse("text-decoration: underline line-through");
        style.remove_token("text-decoration", "underline");
        assert_eq!(style.get("text-decoration"), Some("line-through"));
        style.remove_token("text-decoration", "line-through");
        assert!(style.is_empty());
    }

    #[test]
    fn set_replaces_and_display_round_trips() {
        let mut style = InlineStyle::parse("margin-left: 40px");
        style.set("text-align", "center");
        style.set("margin-left", "80px");
        assert_eq!(style.to_string(), "text-align: center; margin-left: 80px;");
        style.remove("text-align");
        style.remove("margin-left");
        assert!(style.is_empty());
    }
}
