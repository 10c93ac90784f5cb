// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Character formatting.
//!
//! A line of inline content is flattened into runs of text, each carrying
//! the stack of elements that enclose it. Formatting edits those stacks for
//! the selected runs only, and the line is then rebuilt, merging
//! neighbouring runs that share enclosing elements.

use std::collections::HashSet;

use super::segments::SegmentKind;
use super::{inline_group, inline_root, EditingSurface};
use crate::dom::nodes::{ElementNode, NodeData};
use crate::dom::style::InlineStyle;
use crate::dom::tags::{is_atomic_tag, is_block_tag, is_non_rendered_tag};
use crate::dom::{Dom, DomHandle};
use crate::{CommandError, InlineFormat, StyleProperty};

#[derive(Clone, Debug)]
enum RunContent {
    Text(String),
    /// Anything that is moved as a whole: images, line breaks, comments
    /// and elements that hold blocks.
    Node(DomHandle),
}

#[derive(Clone, Debug)]
struct Run {
    /// Enclosing inline elements, outermost first.
    marks: Vec<ElementNode>,
    content: RunContent,
    selected: bool,
}

impl EditingSurface {
    /// Switch an inline format on for the selected text, or off if all of
    /// it already has it. A cursor without a range changes nothing.
    pub(crate) fn toggle_inline_format(
        &mut self,
        format: InlineFormat,
    ) -> Result<(), CommandError> {
        let Some((start, end)) = self.selected_range()? else {
            return Ok(());
        };
        let leaves = self.isolate_text_leaves(start, end);
        let active = !leaves.is_empty()
            && leaves.iter().all(|leaf| format_applies(&self.dom, format, *leaf));
        self.rewrite_runs(&leaves, |marks| {
            if active {
                format.remove_from(marks);
            } else if !marks.iter().any(|m| format.applied_by(m)) {
                marks.push(ElementNode::new(format.tag()));
            }
        });
        Ok(())
    }

    /// Set a character style such as the font size on the selected text.
    pub(crate) fn set_style_property(
        &mut self,
        property: StyleProperty,
        value: &str,
    ) -> Result<(), CommandError> {
        let Some((start, end)) = self.selected_range()? else {
            return Ok(());
        };
        let leaves = self.isolate_text_leaves(start, end);
        let css = property.css_name();
        self.rewrite_runs(&leaves, |marks| {
            let style_span = marks.iter_mut().rev().find(|m| {
                m.tag() == "span" && m.attrs().iter().all(|(name, _)| name == "style")
            });
            match style_span {
                Some(span) => {
                    let mut style =
                        InlineStyle::parse(span.get_attr("style").unwrap_or_default());
                    style.set(css, value);
                    span.set_attr("style", style.to_string());
                }
                None => marks.push(ElementNode::with_attrs(
                    "span",
                    vec![("style".into(), format!("{css}: {value};"))],
                )),
            }
        });
        Ok(())
    }

    /// Remove all character formatting from the selected text. Links stay.
    pub(crate) fn remove_format(&mut self) -> Result<(), CommandError> {
        let Some((start, end)) = self.selected_range()? else {
            return Ok(());
        };
        let leaves = self.isolate_text_leaves(start, end);
        self.rewrite_runs(&leaves, |marks| marks.retain(|m| m.tag() == "a"));
        Ok(())
    }

    /// Make the text between `start` and `end` one link per line, replacing
    /// links already there.
    pub(crate) fn wrap_in_link(&mut self, start: usize, end: usize, href: &str) {
        let leaves = self.isolate_text_leaves(start, end);
        self.rewrite_runs(&leaves, |marks| {
            marks.retain(|m| m.tag() != "a");
            marks.insert(
                0,
                ElementNode::with_attrs("a", vec![("href".into(), href.into())]),
            );
        });
    }

    /// Remove links from the selection, or from the whole link the cursor
    /// is in.
    pub(crate) fn remove_links(&mut self) -> Result<(), CommandError> {
        let selection = self.selection.ok_or(CommandError::NoSelection)?;
        let (start, end) = if selection.is_collapsed() {
            match self.link_extent_at(selection.start()) {
                Some(extent) => extent,
                None => return Ok(()),
            }
        } else {
            (selection.start(), selection.end())
        };
        let leaves = self.isolate_text_leaves(start, end);
        self.rewrite_runs(&leaves, |marks| marks.retain(|m| m.tag() != "a"));
        Ok(())
    }

    fn link_extent_at(&self, offset: usize) -> Option<(usize, usize)> {
        let map = self.segments();
        let leaf = map.leaf_at(offset)?;
        let root = inline_root(&self.dom, leaf.node);
        let anchor = self
            .dom
            .ancestors(leaf.node)
            .into_iter()
            .take_while(|h| *h != root)
            .find(|h| self.dom.has_tag(*h, "a"))?;
        let inside = map
            .segments()
            .iter()
            .filter(|s| s.is_leaf() && self.dom.is_ancestor_of(anchor, s.node));
        let start = inside.clone().map(|s| s.start).min()?;
        let end = inside.map(|s| s.end).max()?;
        Some((start, end))
    }

    /// The range to format: `None` for a collapsed cursor.
    fn selected_range(&self) -> Result<Option<(usize, usize)>, CommandError> {
        let selection = self.selection.ok_or(CommandError::NoSelection)?;
        Ok((!selection.is_collapsed()).then(|| (selection.start(), selection.end())))
    }

    /// Split text at both ends of the range and return the text nodes that
    /// lie inside it.
    fn isolate_text_leaves(&mut self, start: usize, end: usize) -> Vec<DomHandle> {
        self.split_text_at(start);
        self.split_text_at(end);
        self.segments()
            .segments()
            .iter()
            .filter(|s| s.kind == SegmentKind::Text && s.start >= start && s.end <= end)
            .map(|s| s.node)
            .collect()
    }

    fn rewrite_runs(
        &mut self,
        leaves: &[DomHandle],
        mut transform: impl FnMut(&mut Vec<ElementNode>),
    ) {
        let dom = &mut self.dom;
        let selected: HashSet<DomHandle> = leaves.iter().copied().collect();
        let mut groups: Vec<Vec<DomHandle>> = Vec::new();
        for leaf in leaves {
            let group = inline_group(dom, *leaf);
            if !groups.iter().any(|g| g.first() == group.first()) {
                groups.push(group);
            }
        }

        // Later lines first, so that indices of earlier ones stay valid.
        for group in groups.into_iter().rev() {
            let Some(first) = group.first().copied() else {
                continue;
            };
            let (Some(parent), Some(index)) = (dom.parent(first), dom.index_in_parent(first))
            else {
                continue;
            };
            let mut runs = Vec::new();
            for child in &group {
                flatten(dom, *child, &mut Vec::new(), &selected, &mut runs);
            }
            for run in runs.iter_mut().filter(|r| r.selected) {
                transform(&mut run.marks);
            }
            for child in &group {
                dom.detach(*child);
            }
            for (i, node) in build(dom, &runs, 0).into_iter().enumerate() {
                dom.insert_child(parent, index + i, node);
            }
        }
    }
}

/// Whether `leaf` is inside an element applying `format`, looking no
/// further than the block it is in.
pub(crate) fn format_applies(dom: &Dom, format: InlineFormat, leaf: DomHandle) -> bool {
    let root = inline_root(dom, leaf);
    dom.ancestors(leaf)
        .into_iter()
        .take_while(|h| *h != root)
        .filter_map(|h| dom.element(h))
        .any(|el| format.applied_by(el))
}

fn flatten(
    dom: &Dom,
    handle: DomHandle,
    marks: &mut Vec<ElementNode>,
    selected: &HashSet<DomHandle>,
    out: &mut Vec<Run>,
) {
    let node_run = |marks: &Vec<ElementNode>| Run {
        marks: marks.clone(),
        content: RunContent::Node(handle),
        selected: false,
    };
    match dom.data(handle) {
        NodeData::Text(text) => {
            if !text.is_empty() {
                out.push(Run {
                    marks: marks.clone(),
                    content: RunContent::Text(text.clone()),
                    selected: selected.contains(&handle),
                });
            }
        }
        NodeData::Element(el) if !is_opaque(dom, handle, el) => {
            marks.push(el.clone());
            for child in dom.children(handle) {
                flatten(dom, *child, marks, selected, out);
            }
            marks.pop();
        }
        _ => out.push(node_run(marks)),
    }
}

fn is_opaque(dom: &Dom, handle: DomHandle, el: &ElementNode) -> bool {
    let tag = el.tag();
    is_atomic_tag(tag)
        || is_non_rendered_tag(tag)
        || dom.children(handle).is_empty()
        || dom
            .descendants(handle)
            .into_iter()
            .any(|h| dom.tag(h).map(is_block_tag).unwrap_or(false))
}

/// Recreate nodes from runs, nesting runs that share the element at
/// `depth` under one copy of it.
fn build(dom: &mut Dom, runs: &[Run], depth: usize) -> Vec<DomHandle> {
    let mut out = Vec::new();
    let mut last_text: Option<DomHandle> = None;
    let mut i = 0;
    while i < runs.len() {
        let run = &runs[i];
        if run.marks.len() == depth {
            match &run.content {
                RunContent::Text(text) => match last_text.and_then(|h| dom.text_mut(h)) {
                    Some(existing) => existing.push_str(text),
                    None => {
                        let node = dom.create_text(text.as_str());
                        out.push(node);
                        last_text = Some(node);
                    }
                },
                RunContent::Node(node) => {
                    out.push(*node);
                    last_text = None;
                }
            }
            i += 1;
            continue;
        }

        let mark = &run.marks[depth];
        let mut j = i + 1;
        while j < runs.len() && runs[j].marks.len() > depth && runs[j].marks[depth] == *mark {
            j += 1;
        }
        let element = dom.create_element(mark.clone());
        for child in build(dom, &runs[i..j], depth + 1) {
            dom.append_child(element, child);
        }
        out.push(element);
        last_text = None;
        i = j;
    }
    out
}

#[cfg(test)]
mod test {
    use super::super::testutils::surface;
    use crate::{InlineFormat, StyleProperty};

    fn toggled(marked: &str, format: InlineFormat) -> String {
        let mut s = surface(marked);
        s.toggle_inline_format(format).unwrap();
        s.dom.assert_invariants();
        s.to_html()
    }

    #[test]
    fn bold_wraps_the_selected_text() {
        assert_eq!(toggled("<p>f{o}|o</p>", InlineFormat::Bold), "<p>f<strong>o</strong>o</p>");
    }

    #[test]
    fn toggling_again_removes_it() {
        assert_eq!(
            toggled("<p>f{<strong>o</strong>}|o</p>", InlineFormat::Bold),
            "<p>foo</p>"
        );
    }

    #[test]
    fn legacy_synonyms_count_as_active() {
        assert_eq!(toggled("<p>{<b>ab</b>}|</p>", InlineFormat::Bold), "<p>ab</p>");
        assert_eq!(
            toggled("<p>{<del>ab</del>}|</p>", InlineFormat::Strikethrough),
            "<p>ab</p>"
        );
    }

    #[test]
    fn partially_formatted_selection_is_completed() {
        assert_eq!(
            toggled("<p>{a<em>b</em>}|c</p>", InlineFormat::Italic),
            "<p><em>ab</em>c</p>"
        );
    }

    #[test]
    fn removing_from_part_of_a_run_splits_the_element() {
        assert_eq!(
            toggled("<p><u>a{b}|c</u></p>", InlineFormat::Underline),
            "<p><u>a</u>b<u>c</u></p>"
        );
    }

    #[test]
    fn cursor_without_range_changes_nothing() {
        assert_eq!(toggled("<p>wo|rd</p>", InlineFormat::Bold), "<p>word</p>");
    }

    #[test]
    fn formatting_spans_several_blocks() {
        assert_eq!(
            toggled("<p>{a</p><p>b}|</p>", InlineFormat::Italic),
            "<p><em>a</em></p><p><em>b</em></p>"
        );
    }

    #[test]
    fn images_inside_the_selection_are_kept() {
        assert_eq!(
            toggled(r#"<p>{a<img src="x.png">b}|</p>"#, InlineFormat::Bold),
            r#"<p><strong>a</strong><img src="x.png" /><strong>b</strong></p>"#
        );
    }

    #[test]
    fn style_properties_reuse_an_existing_style_span() {
        let mut s = surface(r#"<p><span style="color: red;">{ab}|</span>c</p>"#);
        s.set_style_property(StyleProperty::FontSize, "large").unwrap();
        assert_eq!(
            s.to_html(),
            r#"<p><span style="color: red; font-size: large;">ab</span>c</p>"#
        );
    }

    #[test]
    fn style_property_on_plain_text_adds_a_span() {
        let mut s = surface("<p>{ab}|c</p>");
        s.set_style_property(StyleProperty::ForeColor, "#ff0000").unwrap();
        assert_eq!(s.to_html(), r#"<p><span style="color: #ff0000;">ab</span>c</p>"#);
    }

    #[test]
    fn remove_format_keeps_links() {
        let mut s =
            surface(r#"<p>{<strong><a href="https://x.org">a</a></strong><em>b</em>}|</p>"#);
        s.remove_format().unwrap();
        assert_eq!(s.to_html(), r#"<p><a href="https://x.org">a</a>b</p>"#);
    }

    #[test]
    fn wrapping_in_a_link_replaces_existing_links() {
        let mut s = surface(r#"<p>x{<a href="https://old.org">ab</a>c}|</p>"#);
        s.wrap_in_link(1, 4, "https://new.org");
        assert_eq!(s.to_html(), r#"<p>x<a href="https://new.org">abc</a></p>"#);
    }

    #[test]
    fn links_wrap_formatted_text_from_the_outside() {
        let mut s = surface("<p><strong>a{b}|</strong></p>");
        s.wrap_in_link(1, 2, "https://x.org");
        assert_eq!(
            s.to_html(),
            r#"<p><strong>a</strong><a href="https://x.org"><strong>b</strong></a></p>"#
        );
    }

    #[test]
    fn unlinking_at_a_cursor_removes_the_whole_link() {
        let mut s = surface(r#"<p>x<a href="https://x.org">l|ink</a>y</p>"#);
        s.remove_links().unwrap();
        assert_eq!(s.to_html(), "<p>xlinky</p>");
    }
}
