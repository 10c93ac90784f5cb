// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Two-way binding between the editor and the host's copy of the article
//! body.
//!
//! The host pushes content in with [`ContentSync::set_content`] and hears
//! about user edits through the `on_change` callback. The sync remembers
//! the document the host holds, whether the host sent it or was told about
//! it, and only pushes edits that differ from it. Content coming back that
//! matches the surface is ignored, so an edit never bounces between the
//! two sides.

use tracing::debug;

use crate::commands::EditorCommand;
use crate::editor_model::inbound_dom;
use crate::{ContentUpdate, EditorConfig, EditorModel, EditorUpdate};

pub struct ContentSync<F>
where
    F: FnMut(&str),
{
    model: EditorModel,
    on_change: F,
    /// The document the host holds: the last HTML it sent us or that we
    /// handed to `on_change`.
    host_content: String,
}

impl<F> ContentSync<F>
where
    F: FnMut(&str),
{
    pub fn new(config: EditorConfig, initial_html: &str, on_change: F) -> Self {
        Self {
            model: EditorModel::from_html(config, initial_html),
            on_change,
            host_content: initial_html.to_owned(),
        }
    }

    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    pub fn content(&self) -> String {
        self.model.content()
    }

    /// Take content from the host. Returns whether the surface was replaced;
    /// echoes of our own pushes and equivalent markup are ignored.
    pub fn set_content(&mut self, html: &str) -> bool {
        if self.model.content() == html {
            debug!("ignoring inbound content equal to the surface");
            self.host_content = html.to_owned();
            return false;
        }
        let incoming = inbound_dom(self.model.config(), html);
        if incoming.structurally_eq(self.model.surface().dom()) {
            debug!("ignoring inbound content equivalent to the surface");
            self.host_content = html.to_owned();
            return false;
        }
        self.model.overwrite(incoming);
        self.host_content = html.to_owned();
        true
    }

    /// Run a user operation and push the new content out if it changed.
    pub fn edit(&mut self, op: impl FnOnce(&mut EditorModel) -> EditorUpdate) -> EditorUpdate {
        let update = op(&mut self.model);
        if let ContentUpdate::ReplaceAll { html } = &update.content {
            if *html != self.host_content {
                (self.on_change)(html);
                self.host_content = html.clone();
            }
        }
        update
    }

    pub fn execute(&mut self, name: &str, value: Option<&str>) -> EditorUpdate {
        self.edit(|model| model.execute(name, value))
    }

    pub fn apply(&mut self, command: EditorCommand) -> EditorUpdate {
        self.edit(|model| model.apply(command))
    }

    pub fn paste(&mut self, html: Option<&str>, text: Option<&str>) -> EditorUpdate {
        self.edit(|model| model.paste(html, text))
    }

    pub fn replace_text(&mut self, text: &str) -> EditorUpdate {
        self.edit(|model| model.replace_text(text))
    }

    /// Selection changes never change content, so nothing is pushed.
    pub fn select(&mut self, start: usize, end: usize) -> EditorUpdate {
        self.model.select(start, end)
    }
}
