// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Properties of paste normalization and content sync that must hold for
//! any input, checked with generated markup.

#[cfg(not(target_arch = "wasm32"))]
mod property_tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use article_editor::dom::{parse, Dom};
    use article_editor::sanitizer::{normalize_fragment, AllowedTag};
    use article_editor::{normalize, ContentSync, EditorConfig};
    use proptest::prelude::*;
    use proptest::proptest;

    /// Tags the generated fragments are built from: whitelisted ones, their
    /// synonyms, unknown ones and non-rendered ones. Table parts land in
    /// odd places so the parser's table repair gets exercised too.
    const TAGS: &[&str] = &[
        "p",
        "div",
        "b",
        "i",
        "em",
        "u",
        "del",
        "a",
        "span",
        "h1",
        "h3",
        "ul",
        "li",
        "blockquote",
        "pre",
        "code",
        "table",
        "caption",
        "thead",
        "tbody",
        "tfoot",
        "tr",
        "th",
        "td",
        "marquee",
        "font",
        "section",
        "script",
        "style",
    ];

    const ATTRIBUTES: &[&str] = &[
        r#" onclick="steal()""#,
        r#" onmouseover="steal()""#,
        r#" href="javascript:alert(1)""#,
        r#" href="https://example.com/page""#,
        r#" class="evil""#,
        r#" id="anchor""#,
        r#" title="hint""#,
        r#" style="font-weight:bold""#,
        r#" style="font-style:italic;color:red""#,
        r#" src="https://example.com/a.png""#,
    ];

    fn leaf() -> impl Strategy<Value = String> {
        prop_oneof![
            6 => "[a-zA-Z ]{0,8}",
            1 => Just(String::from("<br>")),
            1 => Just(String::from(r#"<img src="https://example.com/a.png" alt="pic">"#)),
            1 => Just(String::from(r#"<img src="javascript:alert(1)" onerror="steal()">"#)),
        ]
    }

    fn element() -> impl Strategy<Value = String> {
        leaf().prop_recursive(4, 32, 4, |inner| {
            (
                prop::sample::select(TAGS),
                prop::collection::vec(prop::sample::select(ATTRIBUTES), 0..3),
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(tag, attrs, children)| {
                    format!("<{tag}{}>{}</{tag}>", attrs.concat(), children.concat())
                })
        })
    }

    fn article() -> impl Strategy<Value = String> {
        prop::collection::vec(element(), 1..4).prop_map(|parts| parts.concat())
    }

    fn without_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn visible_text(dom: &Dom) -> String {
        without_whitespace(&dom.visible_text(dom.document()))
    }

    fn offending_elements(dom: &Dom) -> Vec<String> {
        dom.descendants(dom.document())
            .into_iter()
            .filter_map(|h| dom.element(h))
            .filter(|el| {
                AllowedTag::lookup(el.tag())
                    .map(|tag| tag.as_ref() != el.tag())
                    .unwrap_or(true)
            })
            .map(|el| el.tag().to_owned())
            .collect()
    }

    fn offending_attributes(dom: &Dom) -> Vec<String> {
        let mut found = Vec::new();
        for handle in dom.descendants(dom.document()) {
            let Some(el) = dom.element(handle) else {
                continue;
            };
            let Some(tag) = AllowedTag::lookup(el.tag()) else {
                continue;
            };
            for (name, value) in el.attrs() {
                let allowed = if name == "class" {
                    value == tag.canonical_class()
                } else {
                    tag.allowed_attributes().contains(&name.as_str())
                };
                let unsafe_value = value.to_ascii_lowercase().contains("javascript:");
                if !allowed || unsafe_value || name.starts_with("on") {
                    found.push(format!("{}[{name}={value}]", el.tag()));
                }
            }
        }
        found
    }

    proptest! {
        /// Property: every element left after normalization is a canonical
        /// whitelisted tag.
        #[test]
        fn prop_only_whitelisted_tags_survive(html in article()) {
            let dom = normalize_fragment(&EditorConfig::default(), &html);

            prop_assert!(
                offending_elements(&dom).is_empty(),
                "{:?} in {}",
                offending_elements(&dom),
                dom.to_html()
            );
        }

        /// Property: tag soup is handled as well as well-formed markup.
        #[test]
        fn prop_tag_soup_only_leaves_whitelisted_tags(
            html in r"(<[a-z]{1,8}( on[a-z]{1,6}=x| href=javascript:x| class=y)?>|</[a-z]{1,8}>|[a-z ]{1,6}){0,16}"
        ) {
            let dom = normalize_fragment(&EditorConfig::default(), &html);

            prop_assert!(offending_elements(&dom).is_empty());
            prop_assert!(offending_attributes(&dom).is_empty());
        }

        /// Property: no handler, foreign class or script URL survives.
        #[test]
        fn prop_attributes_are_stripped_to_the_allow_list(html in article()) {
            let dom = normalize_fragment(&EditorConfig::default(), &html);

            prop_assert!(
                offending_attributes(&dom).is_empty(),
                "{:?} in {}",
                offending_attributes(&dom),
                dom.to_html()
            );
        }

        /// Property: the text a reader sees is unchanged, apart from
        /// whitespace.
        #[test]
        fn prop_visible_text_is_preserved(html in article()) {
            let before = visible_text(&parse(&html));
            let after = visible_text(&normalize_fragment(&EditorConfig::default(), &html));

            prop_assert_eq!(before, after);
        }

        /// Property: normalizing normalized output changes nothing.
        #[test]
        fn prop_normalize_is_idempotent(html in article()) {
            let config = EditorConfig::default();
            let once = normalize(&config, &html);
            let twice = normalize(&config, &once);

            prop_assert_eq!(once, twice);
        }

        /// Property: content set by the host reads back as the same tree,
        /// is not pushed back, and setting it again is ignored.
        #[test]
        fn prop_host_content_round_trips(html in article()) {
            let content = normalize(&EditorConfig::default(), &html);
            let pushes = Rc::new(Cell::new(0));
            let counter = Rc::clone(&pushes);
            let mut sync = ContentSync::new(EditorConfig::default(), "", move |_: &str| {
                counter.set(counter.get() + 1)
            });

            sync.set_content(&content);
            let read_back = sync.content();

            prop_assert!(parse(&read_back).structurally_eq(&parse(&content)));
            prop_assert!(!sync.set_content(&read_back));
            prop_assert_eq!(pushes.get(), 0);
        }
    }
}
