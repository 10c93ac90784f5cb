// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use tracing::{debug, warn};

use crate::commands::history::History;
use crate::dom::{parse, Dom};
use crate::sanitizer::normalize_fragment;
use crate::{
    CommandError, EditingSurface, EditorConfig, EditorState, EditorUpdate, Location,
    Selection,
};

/// One editor: the surface it owns, its undo history and the last state
/// shown to the toolbar.
#[derive(Clone, Debug)]
pub struct EditorModel {
    pub(crate) config: EditorConfig,
    pub(crate) surface: EditingSurface,
    pub(crate) history: History,
    pub(crate) focused: bool,
    pub(crate) last_state: EditorState,
}

impl EditorModel {
    pub fn new(config: EditorConfig) -> Self {
        Self::from_html(config, "")
    }

    pub fn from_html(config: EditorConfig, html: &str) -> Self {
        let dom = inbound_dom(&config, html);
        let history = History::new(config.history_limit);
        let mut surface = EditingSurface::new();
        surface.replace_dom(dom);
        let mut model = Self {
            config,
            surface,
            history,
            focused: false,
            last_state: EditorState::default(),
        };
        model.refresh_state();
        model
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &EditingSurface {
        &self.surface
    }

    /// The document as canonical HTML.
    pub fn content(&self) -> String {
        self.surface.to_html()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.surface.selection()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The state computed after the last operation.
    pub fn state(&self) -> &EditorState {
        &self.last_state
    }

    /// Compute the state for the current selection, falling back to the
    /// last known state when the selection cannot be read.
    pub fn read_state(&mut self) -> EditorState {
        self.refresh_state();
        self.last_state.clone()
    }

    pub fn select(&mut self, start: impl Into<Location>, end: impl Into<Location>) -> EditorUpdate {
        self.surface.set_selection(Some(Selection::new(start, end)));
        self.focused = true;
        self.update_keep()
    }

    pub fn clear_selection(&mut self) -> EditorUpdate {
        self.surface.set_selection(None);
        self.update_keep()
    }

    /// Give the surface focus, putting the cursor at the end if there was
    /// none.
    pub fn focus(&mut self) -> EditorUpdate {
        self.focused = true;
        if self.surface.selection().is_none() {
            let end = self.surface.len();
            self.surface.set_selection(Some(Selection::cursor(end)));
        }
        self.update_keep()
    }

    /// Lose focus. The selection is remembered for when focus comes back.
    pub fn blur(&mut self) -> EditorUpdate {
        self.focused = false;
        self.update_keep()
    }

    /// Replace the whole document. History is cleared and the selection is
    /// kept where it still fits.
    pub fn set_content_from_html(&mut self, html: &str) -> EditorUpdate {
        let dom = inbound_dom(&self.config, html);
        self.overwrite(dom)
    }

    pub(crate) fn overwrite(&mut self, dom: Dom) -> EditorUpdate {
        self.surface.replace_dom(dom);
        self.history.clear();
        self.refresh_state();
        EditorUpdate::replace_all(
            self.surface.to_html(),
            self.surface.selection(),
            self.last_state.clone(),
        )
    }

    pub fn replace_text(&mut self, text: &str) -> EditorUpdate {
        self.mutate("replaceText", |surface, _| surface.replace_text(text))
    }

    pub fn backspace(&mut self) -> EditorUpdate {
        self.mutate("backspace", |surface, _| surface.backspace())
    }

    pub fn delete(&mut self) -> EditorUpdate {
        self.mutate("delete", |surface, _| surface.delete())
    }

    pub fn enter(&mut self) -> EditorUpdate {
        self.mutate("enter", |surface, _| surface.enter())
    }

    /// Paste clipboard content. The HTML flavour is normalized and used when
    /// present; otherwise the plain text is inserted as it is.
    pub fn paste(&mut self, html: Option<&str>, text: Option<&str>) -> EditorUpdate {
        self.mutate("paste", |surface, config| {
            let fragment = match (html.filter(|h| !h.trim().is_empty()), text) {
                (Some(html), _) => normalize_fragment(config, html),
                (None, Some(text)) if !text.is_empty() => {
                    let mut fragment = Dom::new();
                    let document = fragment.document();
                    let node = fragment.create_text(text);
                    fragment.append_child(document, node);
                    fragment
                }
                _ => return Ok(()),
            };
            surface.insert_fragment(&fragment);
            Ok(())
        })
    }

    pub fn undo(&mut self) -> EditorUpdate {
        match self.history.undo(&self.surface) {
            Some(previous) => self.restore(previous),
            None => {
                debug!("nothing to undo");
                self.update_keep()
            }
        }
    }

    pub fn redo(&mut self) -> EditorUpdate {
        match self.history.redo(&self.surface) {
            Some(next) => self.restore(next),
            None => {
                debug!("nothing to redo");
                self.update_keep()
            }
        }
    }

    fn restore(&mut self, surface: EditingSurface) -> EditorUpdate {
        self.surface = surface;
        self.refresh_state();
        EditorUpdate::replace_all(
            self.surface.to_html(),
            self.surface.selection(),
            self.last_state.clone(),
        )
    }

    /// Run one change against the surface. On error the surface is put back
    /// as it was. A change that leaves the HTML as it was is not recorded.
    pub(crate) fn mutate(
        &mut self,
        label: &str,
        op: impl FnOnce(&mut EditingSurface, &EditorConfig) -> Result<(), CommandError>,
    ) -> EditorUpdate {
        let before = self.surface.clone();
        let before_html = before.to_html();
        if let Err(e) = op(&mut self.surface, &self.config) {
            if e.is_silent() {
                debug!(command = label, error = %e, "command ignored");
            } else {
                warn!(command = label, error = %e, "command failed");
            }
            self.surface = before;
            return self.update_keep();
        }

        let html = self.surface.to_html();
        if html == before_html {
            return self.update_keep();
        }
        self.history.push(before);
        self.surface.compact_if_needed();
        #[cfg(feature = "assert-invariants")]
        self.surface.dom.assert_invariants();
        self.refresh_state();
        EditorUpdate::replace_all(html, self.surface.selection(), self.last_state.clone())
    }

    pub(crate) fn update_keep(&mut self) -> EditorUpdate {
        self.refresh_state();
        EditorUpdate::keep(self.surface.selection(), self.last_state.clone())
    }

    fn refresh_state(&mut self) {
        match self.surface.try_read_state() {
            Ok(state) => self.last_state = state,
            Err(e) => debug!(error = %e, "keeping the last known state"),
        }
        self.last_state.can_undo = self.history.can_undo();
        self.last_state.can_redo = self.history.can_redo();
    }
}

impl Default for EditorModel {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Parse content coming from outside the editor, normalizing it first when
/// the configuration asks for that.
pub(crate) fn inbound_dom(config: &EditorConfig, html: &str) -> Dom {
    if config.sanitize_inbound {
        normalize_fragment(config, html)
    } else {
        parse(html)
    }
}
