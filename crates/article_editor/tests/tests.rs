// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::cell::RefCell;
use std::rc::Rc;

use article_editor::dom::parse;
use article_editor::{
    Alignment, BlockFormat, ContentSync, ContentUpdate, EditorCommand,
    EditorConfig, EditorModel, FormatCommand, InlineFormat, LinkRequest, ListType, Selection,
};
use indoc::indoc;

fn paste(html: &str) -> String {
    let mut model = EditorModel::new(EditorConfig::default());
    model.focus();
    model.paste(Some(html), None);
    model.content()
}

#[test]
fn can_instantiate_a_model_and_call_methods() {
    let mut model = EditorModel::new(EditorConfig::default());
    model.focus();
    model.replace_text("foo");
    model.select(1, 2);

    let update = model.apply(EditorCommand::Format(FormatCommand::Inline(
        InlineFormat::Bold,
    )));

    if let ContentUpdate::ReplaceAll { html } = update.content {
        assert_eq!(html, "f<strong>o</strong>o");
    } else {
        panic!("Expected to receive a ReplaceAll response");
    }
}

#[test]
fn pasted_bold_loses_its_handlers() {
    let html = paste(r#"<b onclick="x()">Hi</b>"#);
    assert_eq!(html, r#"<strong class="font-bold">Hi</strong>"#);
}

#[test]
fn pasted_unknown_elements_become_text_spans() {
    let html = paste("<marquee>spin</marquee>");
    assert_eq!(html, r#"<span class="text-base">spin</span>"#);
}

#[test]
fn pasted_scripts_vanish_entirely() {
    let html = paste("<p>ok</p><script>alert(1)</script>");
    assert!(!html.contains("script"));
    assert!(!html.contains("alert"));
    assert_eq!(html, r#"<p class="my-4 leading-7">ok</p>"#);
}

#[test]
fn bold_with_a_bare_cursor_does_nothing() {
    let mut model = EditorModel::from_html(EditorConfig::default(), "<p>word</p>");
    model.select(2, 2);
    let update = model.execute("bold", None);
    assert_eq!(update.content, ContentUpdate::Keep);
    assert_eq!(model.content(), "<p>word</p>");
}

#[test]
fn link_with_text_at_an_empty_cursor() {
    let mut model = EditorModel::new(EditorConfig::default());
    model.focus();
    let update =
        model.insert_link(LinkRequest::new("https://example.com").with_text("Here"));
    assert_eq!(
        update.html(),
        Some(r#"<a href="https://example.com">Here</a>"#)
    );
    assert_eq!(update.state.link_url.as_deref(), Some("https://example.com"));
}

#[test]
fn pasting_a_link_inside_a_link_splits_it() {
    let mut model = EditorModel::from_html(
        EditorConfig::default(),
        r#"<p><a href="https://a.org">abcd</a></p>"#,
    );
    model.select(2, 2);
    let update = model.paste(Some(r#"<a href="https://b.org">X</a>"#), Some("X"));
    let html = update.html().map(String::from);
    assert_eq!(
        html.as_deref(),
        Some(concat!(
            r#"<p><a href="https://a.org">ab</a>"#,
            r#"<a href="https://b.org" class="text-blue-600 underline hover:text-blue-800">X</a>"#,
            r#"<a href="https://a.org">cd</a></p>"#,
        ))
    );
    assert_eq!(update.selection, Some(Selection::cursor(3)));
    let html = html.unwrap_or_default();
    assert_eq!(parse(&html).to_html(), html);
}

#[test]
fn content_set_from_outside_reads_back_equivalent() {
    let mut sync = ContentSync::new(EditorConfig::default(), "", |_: &str| {});
    assert!(sync.set_content("<p>Hello</p>"));
    assert!(parse(&sync.content()).structurally_eq(&parse("<p>Hello</p>")));
}

#[test]
fn pasting_blocks_into_a_paragraph_splits_it() {
    let mut model = EditorModel::from_html(EditorConfig::default(), "<p>ab</p>");
    model.select(1, 1);
    let update = model.paste(
        Some(indoc! {r#"
            <h2 style="color: red">Heading</h2><p onclick="steal()">para</p>"#}),
        Some("Heading para"),
    );
    assert_eq!(
        update.html(),
        Some(concat!(
            "<p>a</p>",
            r#"<h2 class="text-3xl font-bold tracking-tight mt-8 mb-4">Heading</h2>"#,
            r#"<p class="my-4 leading-7">para</p>"#,
            "<p>b</p>",
        ))
    );
    assert_eq!(update.selection, Some(Selection::cursor(14)));
}

#[test]
fn a_writing_session_round_trips_through_the_host() {
    let pushed = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&pushed);
    let mut sync = ContentSync::new(
        EditorConfig::default(),
        "<p>Title</p><p>Body text</p>",
        move |html: &str| sink.borrow_mut().push(html.to_owned()),
    );

    sync.select(0, 0);
    sync.execute("formatBlock", Some("h1"));
    sync.select(6, 10);
    sync.execute("italic", None);
    sync.select(15, 15);
    sync.replace_text("!");
    sync.execute("justifyCenter", None);

    let expected = r#"<h1>Title</h1><p style="text-align: center;"><em>Body</em> text!</p>"#;
    assert_eq!(sync.content(), expected);
    assert_eq!(pushed.borrow().len(), 4);
    assert_eq!(pushed.borrow().last().map(String::as_str), Some(expected));

    // The host echoing our own content back changes nothing.
    assert!(!sync.set_content(expected));

    let state = sync.model().state();
    assert_eq!(state.alignment, Alignment::Center);
    assert_eq!(state.block_format, BlockFormat::Paragraph);
    assert!(state.can_undo);
}

#[test]
fn lists_can_be_built_and_taken_apart() {
    let mut model = EditorModel::from_html(
        EditorConfig::default(),
        "<p>one</p><p>two</p><p>three</p>",
    );
    model.select(0, 13);
    model.execute("insertOrderedList", None);
    assert_eq!(
        model.content(),
        "<ol><li>one</li><li>two</li><li>three</li></ol>"
    );
    assert_eq!(model.state().list_type, Some(ListType::Ordered));

    model.select(5, 5);
    model.execute("indent", None);
    assert_eq!(
        model.content(),
        "<ol><li>one<ol><li>two</li></ol></li><li>three</li></ol>"
    );

    model.execute("outdent", None);
    model.select(0, 13);
    model.execute("insertOrderedList", None);
    assert_eq!(model.content(), "<p>one</p><p>two</p><p>three</p>");
}
