// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use email_address::EmailAddress;
use tracing::debug;
use url::{ParseError, Url};

use crate::dom::nodes::ElementNode;
use crate::dom::Dom;
use crate::sanitizer::url_policy::{is_allowed_url, UrlUse};
use crate::{CommandError, EditingSurface, EditorConfig};

/// A link the user asked for. Without `text`, the selected text becomes
/// the link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRequest {
    pub url: String,
    pub text: Option<String>,
}

impl LinkRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    pub url: String,
    pub alt: Option<String>,
}

impl ImageRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// Turn what the user typed into a link target.
///
/// Bare e-mail addresses get `mailto:`, addresses like `example.com/page`
/// get `https://`, and relative paths are kept as they are.
pub fn normalize_link_url(config: &EditorConfig, url: &str) -> Result<String, CommandError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CommandError::EmptyUrl);
    }
    if !url.contains(':') && EmailAddress::is_valid(url) {
        return Ok(format!("mailto:{url}"));
    }
    match Url::parse(url) {
        // `example.com:8080/x` parses with `example.com` as its scheme.
        Ok(parsed) if parsed.scheme().contains('.') => Ok(format!("https://{url}")),
        Ok(parsed) if config.allows_link_scheme(parsed.scheme()) => Ok(url.to_owned()),
        Ok(_) => Err(CommandError::DisallowedUrl(url.to_owned())),
        Err(ParseError::RelativeUrlWithoutBase) if looks_like_host(url) => {
            Ok(format!("https://{url}"))
        }
        Err(ParseError::RelativeUrlWithoutBase) => Ok(url.to_owned()),
        Err(e) => {
            debug!(%url, error = %e, "link target does not parse");
            Err(CommandError::DisallowedUrl(url.to_owned()))
        }
    }
}

fn looks_like_host(url: &str) -> bool {
    if url.starts_with(['/', '#', '.', '?']) || url.contains(char::is_whitespace) {
        return false;
    }
    let host = url.split(['/', '?', '#']).next().unwrap_or_default();
    host.contains('.') && !host.ends_with('.')
}

impl EditingSurface {
    pub(crate) fn insert_link(
        &mut self,
        config: &EditorConfig,
        request: LinkRequest,
    ) -> Result<(), CommandError> {
        let href = normalize_link_url(config, &request.url)?;
        match request.text.filter(|t| !t.is_empty()) {
            Some(text) => {
                let mut fragment = Dom::new();
                let document = fragment.document();
                let a = fragment
                    .create_element(ElementNode::with_attrs("a", vec![("href".into(), href)]));
                let text = fragment.create_text(text);
                fragment.append_child(document, a);
                fragment.append_child(a, text);
                self.insert_fragment(&fragment);
            }
            None => {
                let selection = self
                    .selection
                    .filter(|s| !s.is_collapsed())
                    .ok_or(CommandError::NoSelection)?;
                self.wrap_in_link(selection.start(), selection.end(), &href);
            }
        }
        Ok(())
    }

    pub(crate) fn insert_image(
        &mut self,
        config: &EditorConfig,
        request: ImageRequest,
    ) -> Result<(), CommandError> {
        let src = request.url.trim();
        if src.is_empty() {
            return Err(CommandError::EmptyUrl);
        }
        if !is_allowed_url(config, src, UrlUse::Image) {
            return Err(CommandError::DisallowedUrl(src.to_owned()));
        }
        let mut attrs = vec![("src".to_owned(), src.to_owned())];
        if let Some(alt) = request.alt {
            attrs.push(("alt".to_owned(), alt));
        }
        let mut fragment = Dom::new();
        let document = fragment.document();
        let img = fragment.create_element(ElementNode::with_attrs("img", attrs));
        fragment.append_child(document, img);
        self.insert_fragment(&fragment);
        Ok(())
    }
}
