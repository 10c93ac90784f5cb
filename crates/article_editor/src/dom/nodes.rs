// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use html5ever::{LocalName, Namespace, QualName};

use super::DomHandle;

pub(crate) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Build the qualified name of an element in the HTML namespace.
pub fn html_name(tag: &str) -> QualName {
    QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(tag),
    )
}

/// An element without its children: qualified name plus attributes in
/// source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementNode {
    pub(crate) name: QualName,
    pub(crate) attrs: Vec<(String, String)>,
}

impl ElementNode {
    pub fn new(tag: &str) -> Self {
        Self {
            name: html_name(tag),
            attrs: Vec::new(),
        }
    }

    pub fn with_attrs(tag: &str, attrs: Vec<(String, String)>) -> Self {
        Self {
            name: html_name(tag),
            attrs,
        }
    }

    pub fn tag(&self) -> &str {
        &self.name.local
    }

    pub fn name(&self) -> &QualName {
        &self.name
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.name = html_name(tag);
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _v)| n == name)
            .map(|(_n, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    pub(crate) fn retain_attrs(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.attrs.retain(|(n, _)| keep(n));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Document,
    Element(ElementNode),
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<DomHandle>,
    pub(crate) children: Vec<DomHandle>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn setting_an_existing_attribute_replaces_its_value() {
        let mut el = ElementNode::new("a");
        el.set_attr("href", "https://a.example");
        el.set_attr("title", "t");
        el.set_attr("href", "https://b.example");
        assert_eq!(
            el.attrs(),
            &[
                ("href".to_owned(), "https://b.example".to_owned()),
                ("title".to_owned(), "t".to_owned())
            ]
        );
    }

    #[test]
    fn renaming_keeps_attributes() {
        let mut el = ElementNode::with_attrs(
            "p",
            vec![("style".into(), "text-align: center".into())],
        );
        el.set_tag("h2");
        assert_eq!(el.tag(), "h2");
        assert_eq!(el.get_attr("style"), Some("text-align: center"));
    }
}
