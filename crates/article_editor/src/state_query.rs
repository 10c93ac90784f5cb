// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum::IntoEnumIterator;

use crate::dom::style::InlineStyle;
use crate::dom::tags::heading_level;
use crate::dom::{Dom, DomHandle};
use crate::state::{Alignment, BlockFormat, EditorState};
use crate::surface::inline_runs::format_applies;
use crate::surface::segments::SegmentKind;
use crate::surface::{list_item_of, nearest_block, EditingSurface};
use crate::{InlineFormat, ListType, StateError};

impl EditingSurface {
    /// Work out the formatting at the selection. History flags are left
    /// unset; the surface knows nothing about history.
    pub fn try_read_state(&self) -> Result<EditorState, StateError> {
        let selection = self.selection.ok_or(StateError::NoSelection)?;
        let map = self.segments();
        if selection.end() > map.len() {
            return Err(StateError::StaleSelection {
                offset: selection.end(),
                len: map.len(),
            });
        }

        let leaves = map.leaves_in(selection.start(), selection.end());
        let mut state = EditorState::default();
        for format in InlineFormat::iter() {
            let active = leaves
                .iter()
                .filter(|s| s.kind == SegmentKind::Text)
                .any(|s| format_applies(&self.dom, format, s.node));
            state.set_active(format, active);
        }

        let Some(start) = leaves.first().map(|s| s.node) else {
            return Ok(state);
        };
        let dom = &self.dom;
        state.alignment = alignment_at(dom, start);
        state.list_type = list_item_of(dom, start)
            .and_then(|li| dom.parent(li))
            .and_then(|list| dom.tag(list))
            .and_then(ListType::from_tag);
        state.block_format = block_format_at(dom, start);
        state.font_size = style_value_at(dom, start, "font-size");
        state.font_family = style_value_at(dom, start, "font-family");
        state.link_url = self_and_ancestors(dom, start)
            .find(|h| dom.has_tag(*h, "a"))
            .and_then(|a| dom.element(a))
            .and_then(|a| a.get_attr("href"))
            .map(str::to_owned);
        Ok(state)
    }
}

fn self_and_ancestors(dom: &Dom, handle: DomHandle) -> impl Iterator<Item = DomHandle> {
    std::iter::once(handle).chain(dom.ancestors(handle))
}

fn style_value_at(dom: &Dom, handle: DomHandle, property: &str) -> Option<String> {
    self_and_ancestors(dom, handle).find_map(|h| {
        let style = dom.element(h)?.get_attr("style")?;
        InlineStyle::parse(style).get(property).map(str::to_owned)
    })
}

fn alignment_at(dom: &Dom, handle: DomHandle) -> Alignment {
    self_and_ancestors(dom, handle)
        .find_map(|h| {
            let el = dom.element(h)?;
            el.get_attr("style")
                .and_then(|s| InlineStyle::parse(s).get("text-align").and_then(Alignment::from_css))
                .or_else(|| el.get_attr("align").and_then(Alignment::from_css))
        })
        .unwrap_or_default()
}

fn block_format_at(dom: &Dom, handle: DomHandle) -> BlockFormat {
    let Some(block) = nearest_block(dom, handle) else {
        return BlockFormat::Paragraph;
    };
    let in_quote = || dom.ancestors(block).into_iter().any(|h| dom.has_tag(h, "blockquote"));
    match dom.tag(block).unwrap_or_default() {
        "pre" => BlockFormat::CodeBlock,
        "blockquote" => BlockFormat::Quote,
        "p" | "div" | "li" if in_quote() => BlockFormat::Quote,
        "p" | "div" | "li" => BlockFormat::Paragraph,
        tag => heading_level(tag)
            .map(BlockFormat::Heading)
            .unwrap_or(BlockFormat::Other),
    }
}

#[cfg(test)]
mod test {
    use crate::state::{Alignment, BlockFormat};
    use crate::surface::testutils::surface;
    use crate::{ListType, StateError};

    #[test]
    fn cursor_inside_bold_text_reports_bold() {
        let state = surface("<p><strong>wo|rd</strong></p>").try_read_state().unwrap();
        assert!(state.bold);
        assert!(!state.italic);
    }

    #[test]
    fn any_formatted_run_in_a_range_counts() {
        let state = surface("<p>{a<i>b</i>}|</p>").try_read_state().unwrap();
        assert!(state.italic);
    }

    #[test]
    fn block_attributes_come_from_the_start() {
        let state = surface(r#"<ol><li style="text-align: center;">{a</li></ol><h2>b}|</h2>"#)
            .try_read_state()
            .unwrap();
        assert_eq!(state.list_type, Some(ListType::Ordered));
        assert_eq!(state.alignment, Alignment::Center);
        assert_eq!(state.block_format, BlockFormat::Paragraph);
    }

    #[test]
    fn headings_quotes_and_code_are_recognised() {
        let read = |html| surface(html).try_read_state().unwrap().block_format;
        assert_eq!(read("<h3>a|</h3>"), BlockFormat::Heading(3));
        assert_eq!(read("<blockquote><p>a|</p></blockquote>"), BlockFormat::Quote);
        assert_eq!(read("<pre>a|</pre>"), BlockFormat::CodeBlock);
        assert_eq!(
            read("<table><tbody><tr><td>a|</td></tr></tbody></table>"),
            BlockFormat::Other
        );
    }

    #[test]
    fn font_and_link_come_from_ancestors() {
        let state = surface(
            r#"<p style="font-family: Georgia;"><a href="https://x.org"><span style="font-size: large;">a|b</span></a></p>"#,
        )
        .try_read_state()
        .unwrap();
        assert_eq!(state.font_size.as_deref(), Some("large"));
        assert_eq!(state.font_family.as_deref(), Some("Georgia"));
        assert_eq!(state.link_url.as_deref(), Some("https://x.org"));
    }

    #[test]
    fn missing_or_stale_selection_is_an_error() {
        assert_eq!(
            surface("<p>a</p>").try_read_state(),
            Err(StateError::NoSelection)
        );
        let mut s = surface("<p>abc|</p>");
        s.dom = crate::dom::parse("<p>a</p>");
        assert_eq!(
            s.try_read_state(),
            Err(StateError::StaleSelection { offset: 3, len: 1 })
        );
    }
}
