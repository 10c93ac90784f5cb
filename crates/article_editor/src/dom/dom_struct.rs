// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use html5ever::QualName;

use super::nodes::{html_name, ElementNode, Node, NodeData};
use super::tags::{is_atomic_tag, is_non_rendered_tag};
use super::DomHandle;

/// The document surface: an arena of nodes addressed by [`DomHandle`].
///
/// Parents refer to their children by handle and every node is owned by
/// the arena. Removing a node only detaches it, so the arena may hold
/// garbage; everything that walks the tree starts from the document node
/// and never sees detached nodes. [`Dom::compacted`] rebuilds the arena
/// without garbage.
#[derive(Clone, Debug)]
pub struct Dom {
    nodes: Vec<Node>,
    document: DomHandle,
    placeholder_name: QualName,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            document: DomHandle(0),
            placeholder_name: html_name(""),
        }
    }

    pub fn document(&self) -> DomHandle {
        self.document
    }

    pub(crate) fn node(&self, handle: DomHandle) -> &Node {
        &self.nodes[handle.0]
    }

    fn node_mut(&mut self, handle: DomHandle) -> &mut Node {
        &mut self.nodes[handle.0]
    }

    pub fn data(&self, handle: DomHandle) -> &NodeData {
        &self.node(handle).data
    }

    pub fn element(&self, handle: DomHandle) -> Option<&ElementNode> {
        match &self.node(handle).data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(
        &mut self,
        handle: DomHandle,
    ) -> Option<&mut ElementNode> {
        match &mut self.node_mut(handle).data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The qualified name of an element, or an empty name for any other
    /// kind of node.
    pub(crate) fn element_name(&self, handle: DomHandle) -> &QualName {
        match &self.node(handle).data {
            NodeData::Element(el) => &el.name,
            _ => &self.placeholder_name,
        }
    }

    pub fn tag(&self, handle: DomHandle) -> Option<&str> {
        self.element(handle).map(|el| el.tag())
    }

    pub(crate) fn has_tag(&self, handle: DomHandle, tag: &str) -> bool {
        self.tag(handle) == Some(tag)
    }

    pub fn text(&self, handle: DomHandle) -> Option<&str> {
        match &self.node(handle).data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub(crate) fn text_mut(&mut self, handle: DomHandle) -> Option<&mut String> {
        match &mut self.node_mut(handle).data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, handle: DomHandle) -> Option<DomHandle> {
        self.node(handle).parent
    }

    pub fn children(&self, handle: DomHandle) -> &[DomHandle] {
        &self.node(handle).children
    }

    pub(crate) fn add_node(&mut self, data: NodeData) -> DomHandle {
        self.nodes.push(Node::new(data));
        DomHandle(self.nodes.len() - 1)
    }

    pub fn create_element(&mut self, element: ElementNode) -> DomHandle {
        self.add_node(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> DomHandle {
        self.add_node(NodeData::Text(text.into()))
    }

    pub fn index_in_parent(&self, handle: DomHandle) -> Option<usize> {
        let parent = self.parent(handle)?;
        self.children(parent).iter().position(|c| *c == handle)
    }

    /// Remove `handle` from its parent. The subtree below it is kept intact.
    pub fn detach(&mut self, handle: DomHandle) {
        if let Some(parent) = self.node(handle).parent {
            self.node_mut(parent).children.retain(|c| *c != handle);
        }
        self.node_mut(handle).parent = None;
    }

    pub fn append_child(&mut self, parent: DomHandle, child: DomHandle) {
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Insert `child` at `index` among the children of `parent`. The index
    /// is interpreted after `child` has been detached from its old place.
    pub fn insert_child(
        &mut self,
        parent: DomHandle,
        index: usize,
        child: DomHandle,
    ) {
        self.detach(child);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn insert_before(&mut self, sibling: DomHandle, child: DomHandle) {
        self.detach(child);
        if let (Some(parent), Some(index)) =
            (self.parent(sibling), self.index_in_parent(sibling))
        {
            self.insert_child(parent, index, child);
        }
    }

    pub fn insert_after(&mut self, sibling: DomHandle, child: DomHandle) {
        self.detach(child);
        if let (Some(parent), Some(index)) =
            (self.parent(sibling), self.index_in_parent(sibling))
        {
            self.insert_child(parent, index + 1, child);
        }
    }

    /// Detach every child of `handle` and return them in order.
    pub fn take_children(&mut self, handle: DomHandle) -> Vec<DomHandle> {
        let children = std::mem::take(&mut self.node_mut(handle).children);
        for child in &children {
            self.node_mut(*child).parent = None;
        }
        children
    }

    /// Put the children of `handle` where `handle` was and detach it.
    pub fn replace_with_children(&mut self, handle: DomHandle) {
        let (Some(parent), Some(index)) =
            (self.parent(handle), self.index_in_parent(handle))
        else {
            return;
        };
        let children = self.take_children(handle);
        self.detach(handle);
        for (i, child) in children.into_iter().enumerate() {
            self.insert_child(parent, index + i, child);
        }
    }

    /// Put `replacement` where `handle` was and detach `handle`.
    pub fn replace_node(&mut self, handle: DomHandle, replacement: DomHandle) {
        self.insert_before(handle, replacement);
        self.detach(handle);
    }

    /// Wrap `handle` in a new element and return the wrapper.
    pub fn wrap(&mut self, handle: DomHandle, wrapper: ElementNode) -> DomHandle {
        let wrapper = self.create_element(wrapper);
        self.insert_before(handle, wrapper);
        self.append_child(wrapper, handle);
        wrapper
    }

    /// Ancestors of `handle`, nearest first, excluding `handle` itself.
    pub fn ancestors(&self, handle: DomHandle) -> Vec<DomHandle> {
        let mut ret = Vec::new();
        let mut cur = self.parent(handle);
        while let Some(h) = cur {
            ret.push(h);
            cur = self.parent(h);
        }
        ret
    }

    /// Whether `ancestor` is a strict ancestor of `handle`.
    pub fn is_ancestor_of(&self, ancestor: DomHandle, handle: DomHandle) -> bool {
        let mut cur = self.parent(handle);
        while let Some(h) = cur {
            if h == ancestor {
                return true;
            }
            cur = self.parent(h);
        }
        false
    }

    /// Whether `handle` is currently reachable from the document node.
    pub fn is_attached(&self, handle: DomHandle) -> bool {
        handle == self.document || self.is_ancestor_of(self.document, handle)
    }

    /// All descendants of `handle` in document order, excluding `handle`.
    pub fn descendants(&self, handle: DomHandle) -> Vec<DomHandle> {
        let mut ret = Vec::new();
        let mut stack: Vec<DomHandle> =
            self.children(handle).iter().rev().copied().collect();
        while let Some(h) = stack.pop() {
            ret.push(h);
            stack.extend(self.children(h).iter().rev());
        }
        ret
    }

    /// Concatenated text of every text node below `handle`.
    pub fn text_content(&self, handle: DomHandle) -> String {
        if let Some(text) = self.text(handle) {
            return text.to_owned();
        }
        self.descendants(handle)
            .into_iter()
            .filter_map(|h| self.text(h))
            .collect()
    }

    /// Text a reader would see below `handle`: like [`Dom::text_content`]
    /// but skipping scripts, styles and other non-rendered elements.
    pub fn visible_text(&self, handle: DomHandle) -> String {
        let mut out = String::new();
        self.collect_visible_text(handle, &mut out);
        out
    }

    fn collect_visible_text(&self, handle: DomHandle, out: &mut String) {
        match self.data(handle) {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(_) => {}
            NodeData::Element(el) if is_non_rendered_tag(el.tag()) => {}
            NodeData::Element(_) | NodeData::Document => {
                for child in self.children(handle) {
                    self.collect_visible_text(*child, out);
                }
            }
        }
    }

    /// Whether `handle` holds anything that occupies a position: non-empty
    /// text or an atomic element such as an image.
    pub(crate) fn has_content(&self, handle: DomHandle) -> bool {
        let is_content = |h: DomHandle| match self.data(h) {
            NodeData::Text(text) => !text.is_empty(),
            NodeData::Element(el) => is_atomic_tag(el.tag()),
            _ => false,
        };
        is_content(handle)
            || self.descendants(handle).into_iter().any(is_content)
    }

    /// Deep-copy the subtree at `handle` in `source` into this arena. The
    /// copy is detached.
    pub fn import_subtree(&mut self, source: &Dom, handle: DomHandle) -> DomHandle {
        let copy = self.add_node(source.data(handle).clone());
        for child in source.children(handle) {
            let child_copy = self.import_subtree(source, *child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Number of nodes in the arena, including detached garbage.
    pub(crate) fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes reachable from the document.
    pub(crate) fn attached_len(&self) -> usize {
        self.descendants(self.document).len() + 1
    }

    /// Rebuild the arena keeping only attached nodes. Invalidates handles.
    pub fn compacted(&self) -> Dom {
        let mut fresh = Dom::new();
        let document = fresh.document();
        for child in self.children(self.document) {
            let copy = fresh.import_subtree(self, *child);
            fresh.append_child(document, copy);
        }
        fresh
    }

    /// Compare two trees ignoring arena layout and attribute order.
    pub fn structurally_eq(&self, other: &Dom) -> bool {
        self.subtree_eq(self.document, other, other.document)
    }

    fn subtree_eq(&self, a: DomHandle, other: &Dom, b: DomHandle) -> bool {
        let data_eq = match (self.data(a), other.data(b)) {
            (NodeData::Element(x), NodeData::Element(y)) => {
                let mut xa = x.attrs.clone();
                let mut ya = y.attrs.clone();
                xa.sort();
                ya.sort();
                x.name == y.name && xa == ya
            }
            (x, y) => x == y,
        };
        let (ca, cb) = (self.children(a), other.children(b));
        data_eq
            && ca.len() == cb.len()
            && ca
                .iter()
                .zip(cb.iter())
                .all(|(x, y)| self.subtree_eq(*x, other, *y))
    }

    /// Check that parent and child links agree for every attached node.
    pub fn assert_invariants(&self) {
        let mut stack = vec![self.document];
        while let Some(h) = stack.pop() {
            for child in self.children(h) {
                assert_eq!(
                    self.parent(*child),
                    Some(h),
                    "child {child:?} of {h:?} points at a different parent"
                );
                if let NodeData::Text(_) | NodeData::Comment(_) =
                    self.data(h)
                {
                    panic!("leaf node {h:?} has children");
                }
                stack.push(*child);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> (Dom, DomHandle, DomHandle, DomHandle) {
        let mut dom = Dom::new();
        let p = dom.create_element(ElementNode::new("p"));
        let a = dom.create_text("a");
        let b = dom.create_text("b");
        dom.append_child(dom.document(), p);
        dom.append_child(p, a);
        dom.append_child(p, b);
        (dom, p, a, b)
    }

    #[test]
    fn insert_child_after_detaching_from_same_parent() {
        let (mut dom, p, a, b) = sample();
        dom.insert_child(p, 1, a);
        assert_eq!(dom.children(p), &[b, a]);
        dom.assert_invariants();
    }

    #[test]
    fn replace_with_children_keeps_position() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let x = dom.create_text("x");
        let em = dom.create_element(ElementNode::new("em"));
        let y = dom.create_text("y");
        let z = dom.create_text("z");
        dom.append_child(doc, x);
        dom.append_child(doc, em);
        dom.append_child(em, y);
        dom.append_child(doc, z);
        dom.replace_with_children(em);
        assert_eq!(dom.children(doc), &[x, y, z]);
        assert!(!dom.is_attached(em));
        dom.assert_invariants();
    }

    #[test]
    fn wrap_puts_wrapper_in_place() {
        let (mut dom, p, a, b) = sample();
        let strong = dom.wrap(b, ElementNode::new("strong"));
        assert_eq!(dom.children(p), &[a, strong]);
        assert_eq!(dom.children(strong), &[b]);
    }

    #[test]
    fn compacted_drops_detached_nodes() {
        let (mut dom, _p, a, _b) = sample();
        dom.detach(a);
        let compact = dom.compacted();
        assert_eq!(compact.arena_len(), compact.attached_len());
        assert!(compact.structurally_eq(&dom));
    }

    #[test]
    fn structural_equality_ignores_attribute_order() {
        let mut x = Dom::new();
        let mut y = Dom::new();
        let a1 = x.create_element(ElementNode::with_attrs(
            "a",
            vec![("href".into(), "u".into()), ("title".into(), "t".into())],
        ));
        let a2 = y.create_element(ElementNode::with_attrs(
            "a",
            vec![("title".into(), "t".into()), ("href".into(), "u".into())],
        ));
        let (dx, dy) = (x.document(), y.document());
        x.append_child(dx, a1);
        y.append_child(dy, a2);
        assert!(x.structurally_eq(&y));
    }

    #[test]
    fn visible_text_skips_scripts() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let script = dom.create_element(ElementNode::new("script"));
        let code = dom.create_text("alert(1)");
        let text = dom.create_text("hi");
        dom.append_child(doc, script);
        dom.append_child(script, code);
        dom.append_child(doc, text);
        assert_eq!(dom.visible_text(doc), "hi");
        assert_eq!(dom.text_content(doc), "alert(1)hi");
    }

    #[test]
    fn has_content_counts_images_but_not_empty_text() {
        let mut dom = Dom::new();
        let p = dom.create_element(ElementNode::new("p"));
        let empty = dom.create_text("");
        dom.append_child(p, empty);
        assert!(!dom.has_content(p));
        let img = dom.create_element(ElementNode::new("img"));
        dom.append_child(p, img);
        assert!(dom.has_content(p));
    }
}
