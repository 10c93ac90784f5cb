// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::borrow::Cow;
use std::cell::{Ref, RefCell};

use html5ever::interface::NextParserState;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{parse_fragment, Attribute, QualName};
use tracing::trace;

use crate::dom::nodes::{html_name, ElementNode, NodeData};
use crate::dom::{Dom, DomHandle};

struct DomCreationState {
    dom: Dom,
    parse_errors: Vec<String>,
}

/// html5ever sink that builds a [`Dom`] directly.
///
/// Parsing never fails: the HTML tree-construction algorithm recovers from
/// every error, so errors are only collected and logged.
pub(crate) struct DomCreator {
    state: RefCell<DomCreationState>,
}

impl DomCreator {
    pub(crate) fn parse(html: &str) -> Dom {
        parse_fragment(
            DomCreator::default(),
            Default::default(),
            html_name("body"),
            vec![],
        )
        .from_utf8()
        .one(html.as_bytes())
    }

    fn append_text_to(dom: &mut Dom, parent: DomHandle, text: &str) {
        let last_text = dom
            .children(parent)
            .last()
            .copied()
            .filter(|h| dom.text(*h).is_some());
        match last_text.and_then(|h| dom.text_mut(h)) {
            Some(existing) => existing.push_str(text),
            None => {
                let new_handle = dom.create_text(text);
                dom.append_child(parent, new_handle);
            }
        }
    }
}

impl Default for DomCreator {
    fn default() -> Self {
        Self {
            state: RefCell::new(DomCreationState {
                dom: Dom::new(),
                parse_errors: Vec::new(),
            }),
        }
    }
}

impl TreeSink for DomCreator {
    type Handle = DomHandle;
    type Output = Dom;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self::Output {
        let DomCreationState {
            mut dom,
            parse_errors,
        } = self.state.into_inner();
        if !parse_errors.is_empty() {
            trace!(errors = ?parse_errors, "recovered from HTML parse errors");
        }
        // Fragment parsing puts everything under a synthetic <html> root.
        let document = dom.document();
        for child in dom.children(document).to_vec() {
            if dom.has_tag(child, "html") {
                dom.replace_with_children(child);
            }
        }
        dom
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.state.borrow_mut().parse_errors.push(String::from(msg));
    }

    fn get_document(&self) -> Self::Handle {
        self.state.borrow().dom.document()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.state.borrow(), |state| state.dom.element_name(*target))
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .into_iter()
            .map(|attr| {
                (String::from(&*attr.name.local), String::from(&*attr.value))
            })
            .collect();
        self.state
            .borrow_mut()
            .dom
            .create_element(ElementNode { name, attrs })
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        self.state
            .borrow_mut()
            .dom
            .add_node(NodeData::Comment(String::from(&*text)))
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        // Processing instructions only exist in XML; keep the data as a
        // comment so nothing is lost.
        self.create_comment(data)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let dom = &mut self.state.borrow_mut().dom;
        match child {
            NodeOrText::AppendNode(child) => dom.append_child(*parent, child),
            NodeOrText::AppendText(tendril) => {
                Self::append_text_to(dom, *parent, &tendril)
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.state.borrow().dom.parent(*element).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Doctypes cannot appear in a fragment.
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {
        // Scripts are never executed.
    }

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template contents live directly under the template element.
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(
        &self,
        sibling: &Self::Handle,
        new_node: NodeOrText<Self::Handle>,
    ) {
        let dom = &mut self.state.borrow_mut().dom;
        match new_node {
            NodeOrText::AppendNode(node) => dom.insert_before(*sibling, node),
            NodeOrText::AppendText(tendril) => {
                let previous = dom.parent(*sibling).and_then(|parent| {
                    let index = dom.index_in_parent(*sibling)?;
                    index
                        .checked_sub(1)
                        .map(|i| dom.children(parent)[i])
                        .filter(|h| dom.text(*h).is_some())
                });
                match previous.and_then(|h| dom.text_mut(h)) {
                    Some(existing) => existing.push_str(&tendril),
                    None => {
                        let text = dom.create_text(String::from(&*tendril));
                        dom.insert_before(*sibling, text);
                    }
                }
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let dom = &mut self.state.borrow_mut().dom;
        if let Some(el) = dom.element_mut(*target) {
            for attr in attrs {
                let name = &*attr.name.local;
                if el.get_attr(name).is_none() {
                    el.set_attr(name, String::from(&*attr.value));
                }
            }
        }
    }

    fn associate_with_form(
        &self,
        _target: &Self::Handle,
        _form: &Self::Handle,
        _nodes: (&Self::Handle, Option<&Self::Handle>),
    ) {
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.state.borrow_mut().dom.detach(*target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let dom = &mut self.state.borrow_mut().dom;
        for child in dom.take_children(*node) {
            dom.append_child(*new_parent, child);
        }
    }

    fn is_mathml_annotation_xml_integration_point(
        &self,
        _handle: &Self::Handle,
    ) -> bool {
        false
    }

    fn set_current_line(&self, _line_number: u64) {}

    fn complete_script(&self, _node: &Self::Handle) -> NextParserState {
        NextParserState::Continue
    }

    fn allow_declarative_shadow_roots(
        &self,
        _intended_parent: &Self::Handle,
    ) -> bool {
        false
    }

    fn attach_declarative_shadow(
        &self,
        _location: &Self::Handle,
        _template: &Self::Handle,
        _attrs: Vec<Attribute>,
    ) -> Result<(), String> {
        Err(String::from("declarative shadow roots are not supported"))
    }
}
