// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use tracing::{debug, warn};

use super::editor_command::{EditorCommand, FormatCommand, HistoryOp, InsertCommand};
use crate::sanitizer::normalize_fragment;
use crate::{
    CommandError, EditingSurface, EditorConfig, EditorModel, EditorUpdate, ImageRequest,
    LinkRequest, StyleProperty,
};

impl EditorModel {
    /// Run a command by its toolbar name. Unknown names and bad values are
    /// logged and change nothing.
    pub fn execute(&mut self, name: &str, value: Option<&str>) -> EditorUpdate {
        match EditorCommand::parse(name, value) {
            Ok(command) => self.apply(command),
            Err(e) => {
                warn!(command = name, error = %e, "rejected command");
                self.update_keep()
            }
        }
    }

    /// Run a command. The surface gets focus back afterwards so typing can
    /// go on.
    pub fn apply(&mut self, command: EditorCommand) -> EditorUpdate {
        let label = command.label();
        debug!(command = label, "applying command");
        let update = match command {
            EditorCommand::History(HistoryOp::Undo) => self.undo(),
            EditorCommand::History(HistoryOp::Redo) => self.redo(),
            EditorCommand::Format(format) => {
                self.mutate(label, |surface, _| apply_format(surface, format))
            }
            EditorCommand::Insert(insert) => {
                self.mutate(label, |surface, config| apply_insert(surface, config, insert))
            }
        };
        self.focused = true;
        update
    }

    /// Insert a link, consuming the request.
    pub fn insert_link(&mut self, request: LinkRequest) -> EditorUpdate {
        self.apply(EditorCommand::Insert(InsertCommand::Link(request)))
    }

    /// Insert an image, consuming the request.
    pub fn insert_image(&mut self, request: ImageRequest) -> EditorUpdate {
        self.apply(EditorCommand::Insert(InsertCommand::Image(request)))
    }
}

fn apply_format(surface: &mut EditingSurface, command: FormatCommand) -> Result<(), CommandError> {
    match command {
        FormatCommand::Inline(format) => surface.toggle_inline_format(format),
        FormatCommand::Block(format) => surface.format_block(format),
        FormatCommand::List(list_type) => surface.toggle_list(list_type),
        FormatCommand::Indent => surface.indent(),
        FormatCommand::Outdent => surface.outdent(),
        FormatCommand::Align(alignment) => surface.align(alignment),
        FormatCommand::RemoveFormat => surface.remove_format(),
        FormatCommand::Unlink => surface.remove_links(),
        FormatCommand::FontSize(size) => surface.set_style_property(StyleProperty::FontSize, &size),
        FormatCommand::FontFamily(family) => {
            surface.set_style_property(StyleProperty::FontFamily, &family)
        }
        FormatCommand::ForeColor(color) => {
            surface.set_style_property(StyleProperty::ForeColor, &color)
        }
        FormatCommand::BackColor(color) => {
            surface.set_style_property(StyleProperty::BackColor, &color)
        }
    }
}

fn apply_insert(
    surface: &mut EditingSurface,
    config: &EditorConfig,
    command: InsertCommand,
) -> Result<(), CommandError> {
    match command {
        InsertCommand::Link(request) => surface.insert_link(config, request),
        InsertCommand::Image(request) => surface.insert_image(config, request),
        InsertCommand::Html(html) => {
            let fragment = normalize_fragment(config, &html);
            surface.insert_fragment(&fragment);
            Ok(())
        }
        InsertCommand::Text(text) => surface.replace_text(&text),
    }
}

#[cfg(test)]
mod test {
    use crate::state::BlockFormat;
    use crate::{ContentUpdate, EditorConfig, EditorModel, ImageRequest, LinkRequest, Selection};

    fn model(html: &str, start: usize, end: usize) -> EditorModel {
        let mut model = EditorModel::from_html(EditorConfig::default(), html);
        model.select(start, end);
        model
    }

    fn model_at(html: &str, cursor: usize) -> EditorModel {
        model(html, cursor, cursor)
    }

    #[test]
    fn execute_runs_named_commands() {
        let mut model = model("<p>Hello</p>", 0, 5);
        let update = model.execute("bold", None);
        assert_eq!(update.html(), Some("<p><strong>Hello</strong></p>"));
        assert!(update.state.bold);
    }

    #[test]
    fn heading_command_changes_the_block() {
        let mut model = model("<p>Hello</p>", 2, 2);
        let update = model.execute("formatBlock", Some("<h2>"));
        assert_eq!(update.html(), Some("<h2>Hello</h2>"));
        assert_eq!(update.state.block_format, BlockFormat::Heading(2));
    }

    #[test]
    fn bad_commands_change_nothing() {
        let mut model = model("<p>Hello</p>", 0, 5);
        for (name, value) in [
            ("explode", None),
            ("fontSize", None),
            ("foreColor", Some("red;x")),
            ("createLink", Some("javascript:alert(1)")),
        ] {
            let update = model.execute(name, value);
            assert_eq!(update.content, ContentUpdate::Keep, "{name}");
        }
        assert_eq!(model.content(), "<p>Hello</p>");
        assert!(!model.state().can_undo);
    }

    #[test]
    fn commands_without_a_cursor_are_ignored() {
        let mut model = EditorModel::from_html(EditorConfig::default(), "<p>Hello</p>");
        let update = model.execute("justifyCenter", None);
        assert_eq!(update.content, ContentUpdate::Keep);
        assert!(model.is_focused());
    }

    #[test]
    fn insert_html_is_normalized() {
        let mut model = model("<p>ab</p>", 1, 1);
        model.execute("insertHTML", Some("<marquee>hi</marquee><script>x</script>"));
        assert_eq!(
            model.content(),
            r#"<p>a<span class="text-base">hi</span>b</p>"#
        );
    }

    #[test]
    fn link_and_image_requests_are_applied() {
        let mut model = model_at("<p>ab</p>", 1);
        let update = model.insert_link(LinkRequest::new("x.org").with_text("L"));
        assert_eq!(update.html(), Some(r#"<p>a<a href="https://x.org">L</a>b</p>"#));
        assert!(model.is_focused());

        let mut model = model_at("<p>ab</p>", 1);
        let update = model.insert_image(ImageRequest::new("https://x.org/i.png"));
        assert_eq!(update.html(), Some(r#"<p>a<img src="https://x.org/i.png" />b</p>"#));
    }

    #[test]
    fn insert_text_is_not_parsed() {
        let mut model = model("<p>ab</p>", 1, 1);
        model.execute("insertText", Some("<b>x</b>"));
        assert_eq!(model.content(), "<p>a&lt;b&gt;x&lt;/b&gt;b</p>");
    }

    #[test]
    fn history_commands_undo_formatting() {
        let mut model = model("<p>Hello</p>", 0, 5);
        model.execute("italic", None);
        let update = model.execute("undo", None);
        assert_eq!(update.html(), Some("<p>Hello</p>"));
        assert_eq!(update.selection, Some(Selection::new(0, 5)));
        assert!(update.state.can_redo);
    }
}
