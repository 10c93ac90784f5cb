// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::nodes::NodeData;
use super::tags::{is_raw_text_tag, is_void_tag};
use super::{Dom, DomHandle};

impl Dom {
    /// Serialize the whole document as an HTML fragment.
    pub fn to_html(&self) -> String {
        self.inner_html(self.document())
    }

    /// Serialize the children of `handle`.
    pub fn inner_html(&self, handle: DomHandle) -> String {
        let mut out = String::new();
        let raw = self.tag(handle).map(is_raw_text_tag).unwrap_or(false);
        self.write_children(handle, raw, &mut out);
        out
    }

    /// Serialize `handle` itself, including its own tag.
    pub fn outer_html(&self, handle: DomHandle) -> String {
        let raw = self
            .parent(handle)
            .and_then(|p| self.tag(p))
            .map(is_raw_text_tag)
            .unwrap_or(false);
        let mut out = String::new();
        self.write_node(handle, raw, &mut out);
        out
    }

    fn write_children(&self, handle: DomHandle, raw: bool, out: &mut String) {
        for child in self.children(handle) {
            self.write_node(*child, raw, out);
        }
    }

    fn write_node(&self, handle: DomHandle, raw: bool, out: &mut String) {
        match self.data(handle) {
            NodeData::Document => self.write_children(handle, false, out),
            NodeData::Text(text) => {
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&encode_text(text));
                }
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(el) => {
                let tag = el.tag();
                out.push('<');
                out.push_str(tag);
                for (name, value) in el.attrs() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&encode_double_quoted_attribute(value));
                    out.push('"');
                }
                if is_void_tag(tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                // The parser drops one newline straight after these tags,
                // so a leading newline in the content has to be doubled.
                if matches!(tag, "pre" | "textarea" | "listing")
                    && self
                        .children(handle)
                        .first()
                        .and_then(|c| self.text(*c))
                        .map(|t| t.starts_with('\n'))
                        .unwrap_or(false)
                {
                    out.push('\n');
                }
                self.write_children(handle, is_raw_text_tag(tag), out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::dom::nodes::ElementNode;
    use crate::dom::Dom;

    #[test]
    fn escapes_text_and_attributes() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let a = dom.create_element(ElementNode::with_attrs(
            "a",
            vec![("title".into(), "say \"hi\"".into())],
        ));
        let text = dom.create_text("1 < 2 & 3");
        dom.append_child(doc, a);
        dom.append_child(a, text);
        assert_eq!(
            dom.to_html(),
            r#"<a title="say &quot;hi&quot;">1 &lt; 2 &amp; 3</a>"#
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let br = dom.create_element(ElementNode::new("br"));
        dom.append_child(doc, br);
        assert_eq!(dom.to_html(), "<br />");
    }

    #[test]
    fn leading_newline_in_pre_is_doubled() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let pre = dom.create_element(ElementNode::new("pre"));
        let text = dom.create_text("\ncode");
        dom.append_child(doc, pre);
        dom.append_child(pre, text);
        assert_eq!(dom.to_html(), "<pre>\n\ncode</pre>");
    }
}
