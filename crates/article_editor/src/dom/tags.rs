// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Element classification used by the surface walk, the serializer and the
//! paste normalizer. Tag names are expected in lower case, which is what
//! html5ever produces for HTML elements.

/// Elements that start a new line of text when rendered.
pub(crate) fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "caption"
            | "dd"
            | "details"
            | "dialog"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hgroup"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
            | "ul"
    )
}

/// Leaf elements that occupy exactly one position in the flattened text.
pub(crate) fn is_atomic_tag(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img")
}

/// Elements serialized without children or a closing tag.
pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose content is never shown to the reader.
pub(crate) fn is_non_rendered_tag(tag: &str) -> bool {
    matches!(
        tag,
        "base"
            | "embed"
            | "head"
            | "iframe"
            | "link"
            | "meta"
            | "noscript"
            | "object"
            | "script"
            | "style"
            | "template"
            | "title"
    )
}

/// Elements whose text children are serialized verbatim.
pub(crate) fn is_raw_text_tag(tag: &str) -> bool {
    matches!(
        tag,
        "iframe"
            | "noembed"
            | "noframes"
            | "noscript"
            | "plaintext"
            | "script"
            | "style"
            | "xmp"
    )
}

/// Block elements that may only hold inline content. Inserting a block
/// inside one of these requires splitting it first.
pub(crate) fn is_phrasing_block_tag(tag: &str) -> bool {
    matches!(tag, "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "pre")
}

/// Containers that can hold block-level children.
pub(crate) fn can_contain_blocks(tag: &str) -> bool {
    is_block_tag(tag) && !is_phrasing_block_tag(tag) && !is_atomic_tag(tag)
}

/// Elements that only make sense inside a table.
pub(crate) fn is_table_part(tag: &str) -> bool {
    matches!(
        tag,
        "caption" | "table" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
    )
}

pub(crate) fn is_list_tag(tag: &str) -> bool {
    matches!(tag, "ul" | "ol")
}

/// Heading level for `h1`..`h6`.
pub(crate) fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}
