// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Commands that act on whole lines: block formats, lists, indentation and
//! alignment.

use tracing::debug;

use super::{inline_group, is_inline_node, list_item_of, nearest_block, EditingSurface};
use crate::dom::nodes::ElementNode;
use crate::dom::style::InlineStyle;
use crate::dom::tags::{is_block_tag, is_list_tag, is_table_part};
use crate::dom::{Dom, DomHandle};
use crate::sanitizer::AllowedTag;
use crate::state::{Alignment, BlockFormat};
use crate::{CommandError, ListType};

const INDENT_STEP_PX: i32 = 40;

impl EditingSurface {
    pub(crate) fn format_block(&mut self, format: BlockFormat) -> Result<(), CommandError> {
        let tag = format.tag().ok_or_else(|| CommandError::InvalidValue {
            command: "formatBlock".into(),
            value: format!("{format:?}"),
        })?;
        for block in self.selected_lines()? {
            retag(&mut self.dom, block, tag);
        }
        Ok(())
    }

    /// Turn the selected lines into a list, change the type of the lists
    /// they are in, or take them out of a list of the same type.
    pub(crate) fn toggle_list(&mut self, list_type: ListType) -> Result<(), CommandError> {
        let leaves = self.selected_leaves()?;
        let items = unique(leaves.iter().filter_map(|l| list_item_of(&self.dom, *l)));
        let all_listed =
            !leaves.is_empty() && leaves.iter().all(|l| list_item_of(&self.dom, *l).is_some());

        if all_listed {
            let same_type = items.iter().all(|li| {
                self.dom
                    .parent(*li)
                    .and_then(|list| self.dom.tag(list))
                    .and_then(ListType::from_tag)
                    == Some(list_type)
            });
            if same_type {
                for li in items.into_iter().rev() {
                    unlist_item(&mut self.dom, li);
                }
            } else {
                let lists = unique(items.iter().filter_map(|li| self.dom.parent(*li)));
                for list in lists {
                    retag(&mut self.dom, list, list_type.tag());
                }
            }
            return Ok(());
        }

        let lines = self.selected_lines()?;
        let mut current: Option<DomHandle> = None;
        for block in lines {
            if list_item_of(&self.dom, block).is_some() {
                continue;
            }
            let previous = self.dom.index_in_parent(block).and_then(|i| {
                let parent = self.dom.parent(block)?;
                i.checked_sub(1).map(|p| self.dom.children(parent)[p])
            });
            let list = match current {
                Some(list) if previous == Some(list) => list,
                _ => {
                    let list = self.dom.create_element(ElementNode::new(list_type.tag()));
                    self.dom.insert_before(block, list);
                    list
                }
            };
            let item = if matches!(self.dom.tag(block), Some("p" | "div")) {
                retag(&mut self.dom, block, "li");
                block
            } else {
                let li = self.dom.create_element(ElementNode::new("li"));
                self.dom.append_child(li, block);
                li
            };
            self.dom.append_child(list, item);
            current = Some(list);
        }
        Ok(())
    }

    /// Nest list items one level deeper, or push other lines to the right.
    pub(crate) fn indent(&mut self) -> Result<(), CommandError> {
        match self.selected_list_items()? {
            Some(items) => {
                for li in items {
                    nest_item(&mut self.dom, li);
                }
            }
            None => {
                for block in self.selected_lines()? {
                    shift_margin(&mut self.dom, block, INDENT_STEP_PX);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn outdent(&mut self) -> Result<(), CommandError> {
        match self.selected_list_items()? {
            Some(items) => {
                for li in items.into_iter().rev() {
                    outdent_item(&mut self.dom, li);
                }
            }
            None => {
                for block in self.selected_lines()? {
                    shift_margin(&mut self.dom, block, -INDENT_STEP_PX);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn align(&mut self, alignment: Alignment) -> Result<(), CommandError> {
        for block in self.selected_lines()? {
            update_style(&mut self.dom, block, |style| match alignment {
                Alignment::Left => style.remove("text-align"),
                other => style.set("text-align", other.css_value()),
            });
        }
        Ok(())
    }

    /// Text and atomic leaves touched by the selection, or the leaf (or
    /// empty block) at the cursor.
    pub(crate) fn selected_leaves(&self) -> Result<Vec<DomHandle>, CommandError> {
        let selection = self.selection.ok_or(CommandError::NoSelection)?;
        Ok(self
            .segments()
            .leaves_in(selection.start(), selection.end())
            .into_iter()
            .map(|s| s.node)
            .filter(|h| !self.dom.has_tag(*h, "hr"))
            .collect())
    }

    /// The list items holding the selection, when every selected leaf is in
    /// one.
    fn selected_list_items(&self) -> Result<Option<Vec<DomHandle>>, CommandError> {
        let leaves = self.selected_leaves()?;
        let items: Option<Vec<DomHandle>> =
            leaves.iter().map(|l| list_item_of(&self.dom, *l)).collect();
        Ok(items.filter(|i| !i.is_empty()).map(unique))
    }

    /// The blocks holding the selected lines, each created if needed.
    fn selected_lines(&mut self) -> Result<Vec<DomHandle>, CommandError> {
        let leaves = self.selected_leaves()?;
        let mut lines = Vec::new();
        for leaf in leaves {
            let block = ensure_line_block(&mut self.dom, leaf);
            if !lines.contains(&block) {
                lines.push(block);
            }
        }
        if lines.is_empty() && self.segments().segments().is_empty() {
            debug!("creating a paragraph in an empty document");
            let document = self.dom.document();
            let p = self.dom.create_element(ElementNode::new("p"));
            self.dom.append_child(document, p);
            lines.push(p);
        }
        Ok(lines)
    }
}

fn unique(handles: impl IntoIterator<Item = DomHandle>) -> Vec<DomHandle> {
    let mut ret = Vec::new();
    for h in handles {
        if !ret.contains(&h) {
            ret.push(h);
        }
    }
    ret
}

fn is_structural(tag: &str) -> bool {
    is_table_part(tag) || is_list_tag(tag) || matches!(tag, "li" | "dd" | "dt" | "dl")
}

fn has_block_children(dom: &Dom, handle: DomHandle) -> bool {
    dom.children(handle)
        .iter()
        .any(|c| dom.tag(*c).map(is_block_tag).unwrap_or(false))
}

/// The block that holds the line `leaf` is on. Lines sitting loose in the
/// document, a list item or a table cell are wrapped in a paragraph first.
fn ensure_line_block(dom: &mut Dom, leaf: DomHandle) -> DomHandle {
    if let Some(block) = nearest_block(dom, leaf) {
        let structural = dom.tag(block).map(is_structural).unwrap_or(false);
        if !structural && !has_block_children(dom, block) {
            return block;
        }
        if block == leaf {
            let p = dom.create_element(ElementNode::new("p"));
            dom.append_child(block, p);
            return p;
        }
    }
    let group = inline_group(dom, leaf);
    let p = dom.create_element(ElementNode::new("p"));
    if let Some(first) = group.first() {
        dom.insert_before(*first, p);
    }
    for node in group {
        dom.append_child(p, node);
    }
    p
}

/// Rename an element, swapping its canonical class for the new tag's.
fn retag(dom: &mut Dom, handle: DomHandle, tag: &str) {
    let Some(el) = dom.element_mut(handle) else {
        return;
    };
    let old_class = AllowedTag::lookup(el.tag()).map(|t| t.canonical_class());
    let had_canonical_class = old_class.is_some() && el.get_attr("class") == old_class;
    el.set_tag(tag);
    if had_canonical_class {
        match AllowedTag::lookup(tag)
            .map(|t| t.canonical_class())
            .filter(|c| !c.is_empty())
        {
            Some(class) => el.set_attr("class", class),
            None => el.remove_attr("class"),
        }
    }
}

fn update_style(dom: &mut Dom, handle: DomHandle, change: impl FnOnce(&mut InlineStyle)) {
    let Some(el) = dom.element_mut(handle) else {
        return;
    };
    let mut style = InlineStyle::parse(el.get_attr("style").unwrap_or_default());
    change(&mut style);
    if style.is_empty() {
        el.remove_attr("style");
    } else {
        el.set_attr("style", style.to_string());
    }
}

fn shift_margin(dom: &mut Dom, block: DomHandle, delta: i32) {
    update_style(dom, block, |style| {
        let current = style
            .get("margin-left")
            .and_then(|v| v.trim().strip_suffix("px"))
            .and_then(|v| v.trim().parse::<f32>().ok())
            .map(|v| v.round() as i32)
            .unwrap_or(0);
        let next = (current + delta).max(0);
        if next == 0 {
            style.remove("margin-left");
        } else {
            style.set("margin-left", &format!("{next}px"));
        }
    });
}

/// Move an item out of its list, putting its content after the list and
/// the items that followed it into a new list of the same kind.
fn unlist_item(dom: &mut Dom, li: DomHandle) {
    let (Some(list), Some(index)) = (dom.parent(li), dom.index_in_parent(li)) else {
        return;
    };
    let following = dom.children(list).get(index + 1..).unwrap_or(&[]).to_vec();
    if !following.is_empty() {
        let rest = match dom.element(list).cloned() {
            Some(el) => dom.create_element(el),
            None => return,
        };
        dom.insert_after(list, rest);
        for item in following {
            dom.append_child(rest, item);
        }
    }

    let (Some(container), Some(list_index)) = (dom.parent(list), dom.index_in_parent(list))
    else {
        return;
    };
    let contents = dom.take_children(li);
    dom.detach(li);
    let mut at = list_index + 1;
    let mut paragraph: Option<DomHandle> = None;
    for child in contents {
        if is_inline_node(dom, child) {
            let p = match paragraph {
                Some(p) => p,
                None => {
                    let p = dom.create_element(ElementNode::new("p"));
                    dom.insert_child(container, at, p);
                    at += 1;
                    paragraph = Some(p);
                    p
                }
            };
            dom.append_child(p, child);
        } else {
            paragraph = None;
            dom.insert_child(container, at, child);
            at += 1;
        }
    }
    if at == list_index + 1 {
        let p = dom.create_element(ElementNode::new("p"));
        dom.insert_child(container, at, p);
    }
    if dom.children(list).is_empty() {
        dom.detach(list);
    }
}

/// Make an item a child of the item before it. The first item of a list
/// stays where it is.
fn nest_item(dom: &mut Dom, li: DomHandle) {
    let (Some(list), Some(index)) = (dom.parent(li), dom.index_in_parent(li)) else {
        return;
    };
    let Some(previous) = index.checked_sub(1).map(|i| dom.children(list)[i]) else {
        debug!("first list item cannot be nested");
        return;
    };
    let sublist = match dom.children(previous).last().copied() {
        Some(last) if dom.tag(last).map(is_list_tag).unwrap_or(false) => last,
        _ => {
            let tag = dom.tag(list).unwrap_or("ul").to_owned();
            let sublist = dom.create_element(ElementNode::new(&tag));
            dom.append_child(previous, sublist);
            sublist
        }
    };
    dom.append_child(sublist, li);
}

/// Move a nested item up one level; a top-level item leaves the list.
fn outdent_item(dom: &mut Dom, li: DomHandle) {
    let (Some(list), Some(index)) = (dom.parent(li), dom.index_in_parent(li)) else {
        return;
    };
    let Some(outer) = dom.parent(list).filter(|p| dom.has_tag(*p, "li")) else {
        unlist_item(dom, li);
        return;
    };
    let following = dom.children(list).get(index + 1..).unwrap_or(&[]).to_vec();
    if !following.is_empty() {
        if let Some(el) = dom.element(list).cloned() {
            let sublist = dom.create_element(el);
            for item in following {
                dom.append_child(sublist, item);
            }
            dom.append_child(li, sublist);
        }
    }
    dom.insert_after(outer, li);
    if dom.children(list).is_empty() {
        dom.detach(list);
    }
}
