// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum::IntoEnumIterator;
use tracing::{debug, trace};

use super::clipboard::preprocess_clipboard_html;
use super::url_policy::{is_allowed_url, UrlUse};
use super::whitelist::{AllowedTag, DEFAULT_TEXT_CLASS};
use crate::dom::nodes::{ElementNode, NodeData};
use crate::dom::style::InlineStyle;
use crate::dom::tags::is_non_rendered_tag;
use crate::dom::{parse, Dom, DomHandle};
use crate::{EditorConfig, InlineFormat};

/// Rewrite an arbitrary HTML fragment into the whitelisted subset and
/// serialize it again.
pub fn normalize(config: &EditorConfig, raw_html: &str) -> String {
    normalize_fragment(config, raw_html).to_html()
}

/// Like [`normalize`], but return the tree instead of serializing it.
pub fn normalize_fragment(config: &EditorConfig, raw_html: &str) -> Dom {
    let cleaned = preprocess_clipboard_html(raw_html);
    let mut dom = parse(&cleaned);
    normalize_dom(config, &mut dom);
    dom
}

/// Normalize every node of `dom` in place.
///
/// Whitelisted elements keep their children, lose every attribute outside
/// their allow-list and get their canonical class. Other elements are
/// replaced by a span holding their visible text, or deleted when they
/// show nothing. Scripts, styles and other non-rendered elements are
/// always deleted along with what they contain.
pub fn normalize_dom(config: &EditorConfig, dom: &mut Dom) {
    let document = dom.document();
    normalize_children(config, dom, document);
}

fn normalize_children(config: &EditorConfig, dom: &mut Dom, parent: DomHandle) {
    for child in dom.children(parent).to_vec() {
        normalize_node(config, dom, child);
    }
}

fn normalize_node(config: &EditorConfig, dom: &mut Dom, handle: DomHandle) {
    let Some(tag_name) = dom.tag(handle).map(str::to_ascii_lowercase) else {
        if matches!(dom.data(handle), NodeData::Comment(_)) {
            dom.detach(handle);
        } else if matches!(dom.data(handle), NodeData::Document) {
            normalize_children(config, dom, handle);
        }
        return;
    };

    if is_non_rendered_tag(&tag_name) {
        debug!(tag = %tag_name, "dropping non-rendered element and its content");
        dom.detach(handle);
        return;
    }

    if tag_name == "span" {
        convert_styled_span(dom, handle);
    }
    let Some(tag) = dom.tag(handle).and_then(AllowedTag::lookup) else {
        flatten_unknown_element(dom, handle, &tag_name);
        return;
    };

    if !rewrite_allowed_element(config, dom, handle, tag) {
        debug!(%tag, "dropping element without a usable source");
        dom.detach(handle);
        return;
    }
    normalize_children(config, dom, handle);
}

/// Give an allowed element its canonical name, attributes and class.
/// Returns false when the element has lost what it needs to exist.
fn rewrite_allowed_element(
    config: &EditorConfig,
    dom: &mut Dom,
    handle: DomHandle,
    tag: AllowedTag,
) -> bool {
    let Some(el) = dom.element_mut(handle) else {
        return false;
    };
    el.set_tag(tag.as_ref());

    let allowed = tag.allowed_attributes();
    el.retain_attrs(|name| allowed.contains(&name));
    for (attr, usage) in [("href", UrlUse::Link), ("src", UrlUse::Image)] {
        if let Some(url) = el.get_attr(attr) {
            if !is_allowed_url(config, url, usage) {
                debug!(attr, url, "dropping URL with a disallowed scheme");
                el.remove_attr(attr);
            }
        }
    }

    let class = tag.canonical_class();
    if !class.is_empty() {
        el.set_attr("class", class);
    }

    tag != AllowedTag::Img || el.get_attr("src").is_some()
}

/// Replace an element that is not allowed with a plain span holding its
/// visible text, or delete it if it shows nothing.
fn flatten_unknown_element(dom: &mut Dom, handle: DomHandle, tag: &str) {
    let text = dom.visible_text(handle);
    if text.chars().all(char::is_whitespace) {
        trace!(tag, "dropping element without visible text");
        dom.detach(handle);
        return;
    }

    trace!(tag, "flattening element that is not allowed");
    let span = dom.create_element(ElementNode::with_attrs(
        AllowedTag::Span.as_ref(),
        vec![("class".into(), DEFAULT_TEXT_CLASS.into())],
    ));
    let text = dom.create_text(text);
    dom.append_child(span, text);

    // A parser re-reading the output would move a span out of table
    // structure to just before the table, so put it there now.
    let table = dom
        .parent(handle)
        .filter(|p| {
            matches!(dom.tag(*p), Some("table" | "thead" | "tbody" | "tfoot" | "tr"))
        })
        .and_then(|p| {
            std::iter::once(p)
                .chain(dom.ancestors(p))
                .find(|a| dom.has_tag(*a, "table"))
        });
    match table {
        Some(table) => {
            dom.insert_before(table, span);
            dom.detach(handle);
        }
        None => dom.replace_node(handle, span),
    }
}

/// Turn a span whose inline style makes its text bold, italic, underlined
/// or struck through into the matching semantic elements.
fn convert_styled_span(dom: &mut Dom, handle: DomHandle) {
    let Some(style) = dom
        .element(handle)
        .and_then(|el| el.get_attr("style"))
        .map(InlineStyle::parse)
    else {
        return;
    };

    let tags: Vec<AllowedTag> = InlineFormat::iter()
        .filter(|format| format.is_declared_by(&style))
        .filter_map(|format| AllowedTag::lookup(format.tag()))
        .collect();

    let Some((outer, inner)) = tags.split_first() else {
        return;
    };
    if let Some(el) = dom.element_mut(handle) {
        el.set_tag(outer.as_ref());
    }
    let mut parent = handle;
    for tag in inner {
        let children = dom.take_children(parent);
        let wrapper = dom.create_element(ElementNode::new(tag.as_ref()));
        dom.append_child(parent, wrapper);
        for child in children {
            dom.append_child(wrapper, child);
        }
        parent = wrapper;
    }
}
