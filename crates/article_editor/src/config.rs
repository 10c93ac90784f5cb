// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

/// Settings for one editor instance. Passed explicitly to everything that
/// needs it; there is no global configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// URL schemes allowed in `href` attributes.
    pub link_schemes: Vec<String>,
    /// URL schemes allowed in `src` attributes of images.
    pub image_schemes: Vec<String>,
    /// Whether `data:image/...` URLs are accepted for images.
    pub allow_data_images: bool,
    /// Maximum number of undo steps kept.
    pub history_limit: usize,
    /// Run content pushed in from outside through the paste normalizer
    /// before it replaces the surface. Off by default: stored articles were
    /// produced by this editor and round-trip unchanged.
    pub sanitize_inbound: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            link_schemes: ["http", "https", "mailto", "tel"]
                .map(String::from)
                .to_vec(),
            image_schemes: ["http", "https"].map(String::from).to_vec(),
            allow_data_images: true,
            history_limit: 100,
            sanitize_inbound: false,
        }
    }
}

impl EditorConfig {
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_sanitize_inbound(mut self, sanitize_inbound: bool) -> Self {
        self.sanitize_inbound = sanitize_inbound;
        self
    }

    pub fn with_link_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link_schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn allows_link_scheme(&self, scheme: &str) -> bool {
        self.link_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
    }

    pub(crate) fn allows_image_scheme(&self, scheme: &str) -> bool {
        self.image_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
    }
}
