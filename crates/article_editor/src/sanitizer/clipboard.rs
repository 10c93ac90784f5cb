// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Clean-up of clipboard HTML before it is parsed. Office suites wrap what
//! they copy in markup that has nothing to do with the content.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Where a clipboard payload came from, as far as can be told from the
/// markup itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipboardSource {
    GoogleDocs,
    MsOffice,
    Unknown,
}

static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<meta[^>]*>").expect("valid regex"));

static GOOGLE_DOCS_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)^\s*<b[^>]*id="docs-internal-guid-[^"]*"[^>]*>(.*)</b>\s*$"#)
        .expect("valid regex")
});

static MS_OFFICE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)urn:schemas-microsoft-com:office|class="?Mso|<o:p>|SCXW\d+"#)
        .expect("valid regex")
});

static MS_OFFICE_PARAGRAPH_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?o:p>").expect("valid regex"));

static CONDITIONAL_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--\[if[^\]]*\]>.*?<!\[endif\]-->").expect("valid regex")
});

impl ClipboardSource {
    pub fn detect(html: &str) -> Self {
        if html.contains("docs-internal-guid-") {
            Self::GoogleDocs
        } else if MS_OFFICE_MARKER.is_match(html) {
            Self::MsOffice
        } else {
            Self::Unknown
        }
    }
}

/// Strip clipboard wrappers from `html`.
///
/// `<meta>` tags are always removed. The bold element Google Docs wraps the
/// whole selection in is unwrapped, and the Office-only `<o:p>` tags and
/// conditional comments are removed.
pub fn preprocess_clipboard_html(html: &str) -> Cow<'_, str> {
    let source = ClipboardSource::detect(html);
    let mut cleaned = META_TAG.replace_all(html, "");
    match source {
        ClipboardSource::GoogleDocs => {
            debug!("unwrapping Google Docs clipboard wrapper");
            let unwrapped =
                GOOGLE_DOCS_WRAPPER.replace(&cleaned, "$1").into_owned();
            cleaned = Cow::Owned(unwrapped);
        }
        ClipboardSource::MsOffice => {
            debug!("removing MS Office clipboard markup");
            let stripped =
                CONDITIONAL_COMMENT.replace_all(&cleaned, "").into_owned();
            let stripped =
                MS_OFFICE_PARAGRAPH_TAG.replace_all(&stripped, "").into_owned();
            cleaned = Cow::Owned(stripped);
        }
        ClipboardSource::Unknown => {}
    }
    cleaned
}

#[cfg(test)]
mod test {
    use indoc::indoc;

    use super::*;

    #[test]
    fn meta_tags_are_removed() {
        let html = r#"<meta charset="utf-8"><meta name="viewport" content="width=device-width"><p>Content after metas</p>"#;
        assert_eq!(preprocess_clipboard_html(html), "<p>Content after metas</p>");
    }

    #[test]
    fn plain_html_is_borrowed_unchanged() {
        let html = "<p><strong>test</strong></p>";
        let cleaned = preprocess_clipboard_html(html);
        assert!(matches!(cleaned, Cow::Borrowed(_)));
        assert_eq!(cleaned, html);
    }

    #[test]
    fn google_docs_wrapper_is_unwrapped() {
        let html = r#"<meta charset='utf-8'><b style="font-weight:normal;" id="docs-internal-guid-bec65465-7fff-9422-b4bc-8e35d97b3ccb"><p><span style="font-weight:700;">Bold</span></p><p>Plain</p></b>"#;
        assert_eq!(ClipboardSource::detect(html), ClipboardSource::GoogleDocs);
        assert_eq!(
            preprocess_clipboard_html(html),
            r#"<p><span style="font-weight:700;">Bold</span></p><p>Plain</p>"#
        );
    }

    #[test]
    fn office_paragraph_markers_are_removed() {
        let html = indoc! {r#"
            <p class=MsoNormal>One<o:p></o:p></p>
            <!--[if !supportLists]--><p>Two</p>"#};
        assert_eq!(ClipboardSource::detect(html), ClipboardSource::MsOffice);
        let cleaned = preprocess_clipboard_html(html);
        assert!(!cleaned.contains("o:p"));
        assert!(cleaned.contains("<p class=MsoNormal>One</p>"));
    }

    #[test]
    fn unknown_sources_are_only_stripped_of_meta() {
        let html = "<meta charset='utf-8'><b>bold</b>";
        assert_eq!(ClipboardSource::detect(html), ClipboardSource::Unknown);
        assert_eq!(preprocess_clipboard_html(html), "<b>bold</b>");
    }
}
