// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use url::{ParseError, Url};

use crate::EditorConfig;

/// What a URL is going to be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UrlUse {
    Link,
    Image,
}

/// Whether `url` may appear in an `href` or `src` attribute.
///
/// Relative URLs carry no scheme and are always allowed. Absolute URLs must
/// use one of the configured schemes; the URL parser strips embedded tabs
/// and newlines first, so `java\nscript:` is caught too.
pub(crate) fn is_allowed_url(config: &EditorConfig, url: &str, usage: UrlUse) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => match (usage, parsed.scheme()) {
            (UrlUse::Image, "data") => {
                config.allow_data_images && is_image_data_url(&parsed)
            }
            (UrlUse::Link, scheme) => config.allows_link_scheme(scheme),
            (UrlUse::Image, scheme) => config.allows_image_scheme(scheme),
        },
        Err(ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

fn is_image_data_url(url: &Url) -> bool {
    url.path()
        .get(..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("image/"))
        .unwrap_or(false)
}

#[cfg(test)]
mod test {
    use super::*;

    fn link(url: &str) -> bool {
        is_allowed_url(&EditorConfig::default(), url, UrlUse::Link)
    }

    fn image(url: &str) -> bool {
        is_allowed_url(&EditorConfig::default(), url, UrlUse::Image)
    }

    #[test]
    fn web_and_mail_links_are_allowed() {
        assert!(link("https://example.com/a?b=c"));
        assert!(link("http://example.com"));
        assert!(link("mailto:someone@example.com"));
        assert!(link("tel:+441234"));
    }

    #[test]
    fn relative_links_are_allowed() {
        assert!(link("/blog/post-1"));
        assert!(link("#section"));
        assert!(link("../up"));
    }

    #[test]
    fn script_urls_are_rejected_however_they_are_spelled() {
        assert!(!link("javascript:alert(1)"));
        assert!(!link("JavaScript:alert(1)"));
        assert!(!link("  javascript:alert(1)"));
        assert!(!link("java\nscript:alert(1)"));
        assert!(!link("vbscript:msgbox"));
        assert!(!link("data:text/html,<script>alert(1)</script>"));
    }

    #[test]
    fn empty_urls_are_rejected() {
        assert!(!link(""));
        assert!(!link("   "));
    }

    #[test]
    fn images_accept_data_urls_only_for_images() {
        assert!(image("https://example.com/cat.png"));
        assert!(image("data:image/png;base64,iVBORw0KGgo="));
        assert!(!image("data:text/html;base64,PHNjcmlwdD4="));
        assert!(!image("mailto:someone@example.com"));
    }

    #[test]
    fn data_images_can_be_disabled() {
        let config = EditorConfig {
            allow_data_images: false,
            ..EditorConfig::default()
        };
        assert!(!is_allowed_url(
            &config,
            "data:image/png;base64,iVBORw0KGgo=",
            UrlUse::Image
        ));
    }
}
