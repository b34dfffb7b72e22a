//! Rendering host backed by the browser DOM.

use cinema_comments_core::render::{
    COUNT_CLASS, DELETE_CLASS, EMOJI_ITEM_CLASS, EMOJI_LIST_CLASS, INPUT_CLASS, LIST_CLASS, PREVIEW_CLASS,
};
use cinema_comments_core::{RenderHost, Target};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTemplateElement, HtmlTextAreaElement};

#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("DOM call failed: {0}")]
    Js(String),
    #[error("markup produced no element")]
    EmptyMarkup,
    #[error("no document available")]
    NoDocument,
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<DomError> for JsValue {
    fn from(err: DomError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub struct DomHost {
    document: Document,
}

impl DomHost {
    pub fn new() -> Result<Self, DomError> {
        let document = web_sys::window().and_then(|w| w.document()).ok_or(DomError::NoDocument)?;
        Ok(Self { document })
    }
}

pub fn selector(target: &Target) -> String {
    match target {
        Target::Count => format!(".{}", COUNT_CLASS),
        Target::List => format!(".{}", LIST_CLASS),
        Target::EmojiList => format!(".{}", EMOJI_LIST_CLASS),
        Target::TextInput => format!(".{}", INPUT_CLASS),
        Target::EmojiOption(e) => format!(".{}[value=\"{}\"]", EMOJI_ITEM_CLASS, web_sys::css::escape(e.as_str())),
        Target::Preview => format!(".{}", PREVIEW_CLASS),
        Target::DeleteButton(id) => format!(".{}[data-id=\"{}\"]", DELETE_CLASS, web_sys::css::escape(id.as_str())),
    }
}

impl RenderHost for DomHost {
    type Node = Element;
    type Error = DomError;

    fn create_element(&self, markup: &str) -> Result<Element, DomError> {
        let template: HtmlTemplateElement = self.document.create_element("template")?.unchecked_into();
        template.set_inner_html(markup.trim());
        template.content().first_element_child().ok_or(DomError::EmptyMarkup)
    }

    fn replace(&self, old: &Element, new: &Element) -> Result<(), DomError> {
        old.replace_with_with_node_1(new)?;
        Ok(())
    }

    fn append(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn find(&self, root: &Element, target: &Target) -> Option<Element> {
        root.query_selector(&selector(target)).ok().flatten()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_inner_html(&self, node: &Element, markup: &str) {
        node.set_inner_html(markup);
    }

    fn set_value(&self, node: &Element, value: &str) {
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn set_disabled(&self, node: &Element, disabled: bool) {
        if let Err(e) = node.toggle_attribute_with_force("disabled", disabled) {
            log::error!("could not toggle disabled: {:?}", e);
        }
    }

    fn shake(&self, node: &Element, duration_ms: u32) {
        let Some(el) = node.dyn_ref::<HtmlElement>() else { return };
        let style = el.style();
        let animation = format!("shake {}s", f64::from(duration_ms) / 1000.0);
        if let Err(e) = style.set_property("animation", &animation) {
            log::error!("could not start shake: {:?}", e);
            return;
        }
        let clear = Closure::once_into_js(move || {
            let _ = style.remove_property("animation");
        });
        let scheduled = web_sys::window().map(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(clear.unchecked_ref(), duration_ms as i32)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            log::warn!("shake animation will not be cleared");
        }
    }
}
