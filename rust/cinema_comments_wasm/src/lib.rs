mod dispatcher;
mod dom;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cinema_comments_core::comment::parse_collection;
use cinema_comments_core::{
    delete_comment, is_submit_gesture, submit_comment, CommentId, CommentsController, CommentsView, Emotion, Patch,
    RenderHost, Target, ThreadConfig, View,
};
use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};

use dispatcher::JsDispatcher;
use dom::DomHost;

type Listener = Closure<dyn FnMut(Event)>;

#[derive(Default)]
struct Listeners {
    form: Vec<(Element, &'static str, Listener)>,
    delete: Vec<(Element, Listener)>,
}

struct Inner {
    host: DomHost,
    thread: Rc<RefCell<CommentsController>>,
    view: RefCell<CommentsView<DomHost>>,
    dispatcher: JsDispatcher,
    listeners: RefCell<Listeners>,
}

impl Inner {
    fn flush(self: &Rc<Self>, patches: Vec<Patch>) {
        if patches.is_empty() {
            return;
        }
        let applied = self.view.borrow().apply(&self.host, &patches);
        match applied {
            Ok(true) => self.bind_delete_buttons(),
            Ok(false) => {}
            Err(e) => log::error!("applying view patches failed: {}", e),
        }
    }

    fn root(&self) -> Option<Element> {
        self.view.borrow().root().cloned()
    }

    fn find(&self, target: &Target) -> Option<Element> {
        self.root().and_then(|root| self.host.find(&root, target))
    }

    fn on_keydown(self: &Rc<Self>, event: Event) {
        // keep popup-level shortcuts (Escape closes the popup) out of the text field
        event.stop_propagation();
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else { return };
        if !is_submit_gesture(&key.key(), key.ctrl_key(), key.meta_key()) {
            return;
        }
        event.prevent_default();
        if let Some(area) = event.target().and_then(|t| t.dyn_into::<HtmlTextAreaElement>().ok()) {
            self.thread.borrow_mut().set_draft_text(area.value());
        }
        let inner = self.clone();
        spawn_local(async move {
            let flush_to = inner.clone();
            if let Err(e) = submit_comment(&inner.thread, &inner.dispatcher, |p| flush_to.flush(p)).await {
                log::debug!("submit not dispatched: {}", e);
            }
        });
    }

    fn on_input(&self, event: Event) {
        if let Some(area) = event.target().and_then(|t| t.dyn_into::<HtmlTextAreaElement>().ok()) {
            self.thread.borrow_mut().set_draft_text(area.value());
        }
    }

    fn on_emoji_change(self: &Rc<Self>, event: Event) {
        let Some(input) = event.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else { return };
        let selected = input.value().parse::<Emotion>().and_then(|e| self.thread.borrow_mut().select_emotion(e));
        if let Err(e) = selected {
            log::warn!("emotion not selected: {}", e);
        }
        let patches = self.thread.borrow_mut().take_patches();
        self.flush(patches);
    }

    fn on_delete_click(self: &Rc<Self>, event: Event) {
        event.prevent_default();
        let Some(id) = event.target().and_then(|t| t.dyn_into::<Element>().ok()).and_then(|b| b.get_attribute("data-id"))
        else {
            return;
        };
        let inner = self.clone();
        spawn_local(async move {
            let flush_to = inner.clone();
            let id = CommentId::from(id);
            if let Err(e) = delete_comment(&inner.thread, &inner.dispatcher, &id, |p| flush_to.flush(p)).await {
                log::debug!("delete not dispatched: {}", e);
            }
        });
    }

    fn listener(self: &Rc<Self>, handler: fn(&Rc<Inner>, Event)) -> Listener {
        let weak: Weak<Inner> = Rc::downgrade(self);
        Closure::wrap(Box::new(move |event: Event| {
            if let Some(inner) = weak.upgrade() {
                handler(&inner, event);
            }
        }) as Box<dyn FnMut(Event)>)
    }

    fn bind_form(self: &Rc<Self>) -> Result<(), JsValue> {
        let bindings: [(Target, &'static str, fn(&Rc<Inner>, Event)); 3] = [
            (Target::TextInput, "keydown", |inner, e| inner.on_keydown(e)),
            (Target::TextInput, "input", |inner, e| inner.on_input(e)),
            (Target::EmojiList, "change", |inner, e| inner.on_emoji_change(e)),
        ];
        let mut bound = Vec::new();
        for (target, kind, handler) in bindings {
            let el = self.find(&target).ok_or_else(|| JsValue::from_str("comment form is not mounted"))?;
            let listener = self.listener(handler);
            el.add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
            bound.push((el, kind, listener));
        }
        self.listeners.borrow_mut().form = bound;
        Ok(())
    }

    /// The previous buttons went away with the old list, so their listeners are dropped.
    fn bind_delete_buttons(self: &Rc<Self>) {
        let Some(root) = self.root() else { return };
        let mut bound = Vec::new();
        if let Ok(buttons) = root.query_selector_all(&format!(".{}", cinema_comments_core::render::DELETE_CLASS)) {
            for i in 0..buttons.length() {
                let Some(button) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else { continue };
                let listener = self.listener(|inner, e| inner.on_delete_click(e));
                match button.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref()) {
                    Ok(()) => bound.push((button, listener)),
                    Err(e) => log::error!("could not bind delete button: {:?}", e),
                }
            }
        }
        self.listeners.borrow_mut().delete = bound;
    }

    fn unbind(&self) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for (el, kind, listener) in &listeners.form {
            let _ = el.remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref());
        }
        for (el, listener) in &listeners.delete {
            let _ = el.remove_event_listener_with_callback("click", listener.as_ref().unchecked_ref());
        }
    }
}

/// Comment section of the film details popup.
#[wasm_bindgen]
pub struct CommentsWidget {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl CommentsWidget {
    /// `handler(action, updateType, payload)` performs the request and
    /// resolves with the fresh comment list, or with nothing.
    #[wasm_bindgen(constructor)]
    pub fn new(comments_json: String, config_json: String, handler: Function) -> Result<CommentsWidget, JsValue> {
        // a logger from an earlier widget stays installed
        let _ = console_log::init_with_level(log::Level::Info);
        let comments = parse_collection(&comments_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut config = ThreadConfig::from_json(&config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        if config.utc_offset_minutes.is_none() {
            // getTimezoneOffset counts minutes west of UTC
            config.utc_offset_minutes = Some(-(js_sys::Date::new_0().get_timezone_offset() as i32));
        }
        let dispatcher = JsDispatcher::new(handler, config.dispatch_timeout_ms);
        let thread = Rc::new(RefCell::new(CommentsController::new(comments, config)));
        let inner = Inner {
            host: DomHost::new()?,
            view: RefCell::new(CommentsView::new(thread.clone())),
            thread,
            dispatcher,
            listeners: RefCell::new(Listeners::default()),
        };
        Ok(CommentsWidget { inner: Rc::new(inner) })
    }

    pub fn set_log_level(&self, level: String) {
        log::set_max_level(level.parse().unwrap_or(log::LevelFilter::Info));
    }

    pub fn mount(&self, parent: &Element) -> Result<(), JsValue> {
        self.inner.view.borrow_mut().mount(&self.inner.host, parent)?;
        self.inner.bind_form()?;
        self.inner.bind_delete_buttons();
        Ok(())
    }

    pub fn unmount(&self) {
        self.inner.unbind();
        self.inner.view.borrow_mut().unmount(&self.inner.host);
    }

    pub fn element(&self) -> Option<Element> {
        self.inner.root()
    }

    pub fn to_html(&self) -> String {
        self.inner.thread.borrow().section_html()
    }

    pub fn comment_count(&self) -> u32 {
        self.inner.thread.borrow().comments().len() as u32
    }

    pub fn comments_json(&self) -> String {
        serde_json::to_string(self.inner.thread.borrow().comments()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Drop for CommentsWidget {
    fn drop(&mut self) {
        self.inner.unbind();
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    const COMMENTS: &str = r#"[
        {"id": "1", "author": "Ilya O'Reilly", "comment": "a film that changed my life", "date": "2019-05-11T16:12:32.554Z", "emotion": "smile"},
        {"id": "2", "author": "Tim", "comment": "<i>boring</i>", "date": "2019-05-12T10:00:00.000Z", "emotion": "sleeping"}
    ]"#;

    fn widget() -> CommentsWidget {
        let handler = Function::new_with_args("action, update, payload", "return null;");
        CommentsWidget::new(COMMENTS.to_string(), String::new(), handler).unwrap()
    }

    #[wasm_bindgen_test]
    fn renders_count_and_escapes() {
        let w = widget();
        assert_eq!(w.comment_count(), 2);
        let html = w.to_html();
        assert!(html.contains("&lt;i&gt;boring&lt;/i&gt;"));
    }

    #[wasm_bindgen_test]
    fn mounts_and_unmounts() {
        let document = web_sys::window().unwrap().document().unwrap();
        let parent = document.create_element("div").unwrap();
        let w = widget();
        w.mount(&parent).unwrap();
        assert_eq!(parent.child_element_count(), 1);
        assert_eq!(parent.query_selector_all(".film-details__comment-delete").unwrap().length(), 2);
        w.unmount();
        assert_eq!(parent.child_element_count(), 0);
    }

    #[wasm_bindgen_test]
    #[allow(deprecated)]
    fn emoji_change_swaps_preview() {
        let document = web_sys::window().unwrap().document().unwrap();
        let parent = document.create_element("div").unwrap();
        let w = widget();
        w.mount(&parent).unwrap();
        for emoji in ["smile", "angry"] {
            let option: HtmlInputElement = parent
                .query_selector(&format!("#emoji-{}", emoji))
                .unwrap()
                .unwrap()
                .unchecked_into();
            option.set_checked(true);
            let event = Event::new_with_event_init_dict("change", web_sys::EventInit::new().bubbles(true)).unwrap();
            option.dispatch_event(&event).unwrap();
        }
        let previews = parent.query_selector_all(".film-details__add-emoji-label").unwrap();
        assert_eq!(previews.length(), 1);
        let html = previews.item(0).unwrap().dyn_into::<Element>().unwrap().inner_html();
        assert!(html.contains("angry.png"));
    }

    #[wasm_bindgen_test]
    fn dates_use_the_browser_offset_unless_configured() {
        let handler = Function::new_no_args("return null;");
        let pinned = CommentsWidget::new(COMMENTS.to_string(), r#"{"utc_offset_minutes":180}"#.into(), handler).unwrap();
        assert!(pinned.to_html().contains("2019/05/11 19:12"));

        let local = widget();
        let expected = local.inner.thread.borrow().config().utc_offset_minutes;
        let west = js_sys::Date::new_0().get_timezone_offset() as i32;
        assert_eq!(expected, Some(-west));
    }

    #[wasm_bindgen_test]
    fn bad_comments_json_is_an_error() {
        let handler = Function::new_no_args("return null;");
        assert!(CommentsWidget::new("{".into(), String::new(), handler).is_err());
    }
}
