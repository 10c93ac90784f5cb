// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Browser bindings: an [`ArticleEditor`] owns the engine and reports every
//! content change to a JavaScript listener.

use std::cell::RefCell;

use article_editor::{
    ContentSync, EditorConfig, EditorState, ImageRequest, InlineFormat, LinkRequest,
};
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;

type Listener = Box<dyn FnMut(&str)>;

#[wasm_bindgen]
pub struct ArticleEditor {
    inner: RefCell<ContentSync<Listener>>,
}

#[wasm_bindgen]
impl ArticleEditor {
    /// Create an editor showing `initial_html`. `on_change` is called with
    /// the new document whenever an edit changes it.
    #[wasm_bindgen(constructor)]
    pub fn new(initial_html: &str, on_change: Function) -> Self {
        console_error_panic_hook::set_once();
        let listener: Listener = Box::new(move |html: &str| {
            if let Err(e) = on_change.call1(&JsValue::NULL, &JsValue::from_str(html)) {
                tracing::warn!(error = ?e, "content listener threw");
            }
        });
        Self {
            inner: RefCell::new(ContentSync::new(
                EditorConfig::default(),
                initial_html,
                listener,
            )),
        }
    }

    /// Replace the document with content from the host. Returns false when
    /// nothing changed, including when the host hands back content while
    /// its listener is still running.
    pub fn set_content(&self, html: &str) -> bool {
        match self.inner.try_borrow_mut() {
            Ok(mut sync) => sync.set_content(html),
            Err(_) => false,
        }
    }

    pub fn content(&self) -> Result<String, JsValue> {
        self.with_sync(|sync| sync.content())
    }

    /// Run a named command such as `bold` or `formatBlock` with an optional
    /// value.
    pub fn execute(&self, name: &str, value: Option<String>) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.execute(name, value.as_deref()))
    }

    pub fn paste(
        &self,
        html: Option<String>,
        text: Option<String>,
    ) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.paste(html.as_deref(), text.as_deref()))
    }

    pub fn select(&self, start: u32, end: u32) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.select(start as usize, end as usize))
    }

    pub fn focus(&self) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.edit(|model| model.focus()))
    }

    pub fn blur(&self) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.edit(|model| model.blur()))
    }

    pub fn replace_text(&self, text: &str) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.replace_text(text))
    }

    pub fn backspace(&self) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.edit(|model| model.backspace()))
    }

    pub fn delete(&self) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.edit(|model| model.delete()))
    }

    pub fn enter(&self) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.edit(|model| model.enter()))
    }

    pub fn undo(&self) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.edit(|model| model.undo()))
    }

    pub fn redo(&self) -> Result<EditorUpdate, JsValue> {
        self.edit(|sync| sync.edit(|model| model.redo()))
    }

    pub fn insert_link(
        &self,
        url: &str,
        text: Option<String>,
    ) -> Result<EditorUpdate, JsValue> {
        let mut request = LinkRequest::new(url);
        if let Some(text) = text {
            request = request.with_text(text);
        }
        self.edit(|sync| sync.edit(|model| model.insert_link(request)))
    }

    pub fn insert_image(
        &self,
        url: &str,
        alt: Option<String>,
    ) -> Result<EditorUpdate, JsValue> {
        let mut request = ImageRequest::new(url);
        if let Some(alt) = alt {
            request = request.with_alt(alt);
        }
        self.edit(|sync| sync.edit(|model| model.insert_image(request)))
    }

    /// Formatting state at the selection, as computed after the last call.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        let state = self.with_sync(|sync| sync.model().state().clone())?;
        state_to_js(&state)
    }
}

impl ArticleEditor {
    fn with_sync<T>(&self, f: impl FnOnce(&ContentSync<Listener>) -> T) -> Result<T, JsValue> {
        let sync = self.inner.try_borrow().map_err(|_| busy())?;
        Ok(f(&sync))
    }

    fn edit(
        &self,
        f: impl FnOnce(&mut ContentSync<Listener>) -> article_editor::EditorUpdate,
    ) -> Result<EditorUpdate, JsValue> {
        let mut sync = self.inner.try_borrow_mut().map_err(|_| busy())?;
        Ok(EditorUpdate { inner: f(&mut sync) })
    }
}

fn busy() -> JsValue {
    JsValue::from_str("editor is busy notifying its listener")
}

/// The outcome of one call on an [`ArticleEditor`].
#[wasm_bindgen]
pub struct EditorUpdate {
    inner: article_editor::EditorUpdate,
}

#[wasm_bindgen]
impl EditorUpdate {
    /// The new document, or undefined when it did not change.
    #[wasm_bindgen(getter)]
    pub fn html(&self) -> Option<String> {
        self.inner.html().map(String::from)
    }

    #[wasm_bindgen(getter)]
    pub fn selection_start(&self) -> Option<u32> {
        self.inner
            .selection
            .as_ref()
            .and_then(|s| u32::try_from(s.start()).ok())
    }

    #[wasm_bindgen(getter)]
    pub fn selection_end(&self) -> Option<u32> {
        self.inner
            .selection
            .as_ref()
            .and_then(|s| u32::try_from(s.end()).ok())
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        state_to_js(&self.inner.state)
    }
}

fn state_to_js(state: &EditorState) -> Result<JsValue, JsValue> {
    let object = Object::new();
    let set = |key: &str, value: JsValue| -> Result<(), JsValue> {
        Reflect::set(&object, &JsValue::from_str(key), &value).map(|_| ())
    };
    for (key, format) in [
        ("bold", InlineFormat::Bold),
        ("italic", InlineFormat::Italic),
        ("underline", InlineFormat::Underline),
        ("strikethrough", InlineFormat::Strikethrough),
    ] {
        set(key, JsValue::from_bool(state.is_active(format)))?;
    }
    set("fontSize", optional(state.font_size.as_deref()))?;
    set("fontName", optional(state.font_family.as_deref()))?;
    set("alignment", JsValue::from_str(state.alignment.as_ref()))?;
    set(
        "listType",
        optional(state.list_type.as_ref().map(|list| list.tag())),
    )?;
    set("blockFormat", optional(state.block_format.tag()))?;
    set("link", optional(state.link_url.as_deref()))?;
    set("canUndo", JsValue::from_bool(state.can_undo))?;
    set("canRedo", JsValue::from_bool(state.can_redo))?;
    Ok(object.into())
}

fn optional(value: Option<&str>) -> JsValue {
    value.map(JsValue::from_str).unwrap_or(JsValue::NULL)
}
