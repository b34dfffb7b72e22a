//! Adapts a JavaScript action handler to the [`Dispatcher`] contract.
//!
//! The handler is called as `handler(action, updateType, payload)` and may
//! return a value or a promise. A resolved `null`/`undefined` is success
//! without a fresh collection; an array (or its JSON text) is the fresh
//! collection; a rejection or a thrown exception is a failure.

use async_trait::async_trait;
use cinema_comments_core::comment::parse_collection;
use cinema_comments_core::{ActionPayload, DispatchError, DispatchOutcome, Dispatcher, UpdateType, UserAction};
use js_sys::{Array, Function, Object, Promise, JSON};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub struct JsDispatcher {
    handler: Function,
    timeout_ms: Option<u32>,
}

impl JsDispatcher {
    pub fn new(handler: Function, timeout_ms: Option<u32>) -> Self {
        Self { handler, timeout_ms }
    }

    /// Races `reply` against a timer resolving to `marker`.
    fn with_timeout(reply: Promise, ms: u32, marker: &Object) -> Promise {
        let marker = marker.clone();
        let timer = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|w| {
                w.set_timeout_with_callback_and_timeout_and_arguments_1(&resolve, ms as i32, &marker)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                log::warn!("dispatch timeout could not be scheduled");
            }
        });
        Promise::race(&Array::of2(&reply, &timer))
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn decode(value: JsValue) -> DispatchOutcome {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    let text = match value.as_string() {
        Some(text) => text,
        None => JSON::stringify(&value)
            .map_err(|e| DispatchError::Decode(describe(&e)))?
            .as_string()
            .unwrap_or_default(),
    };
    parse_collection(&text).map(Some).map_err(|e| DispatchError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl Dispatcher for JsDispatcher {
    async fn dispatch(&self, action: UserAction, update: UpdateType, payload: ActionPayload) -> DispatchOutcome {
        let payload = serde_json::to_string(&payload)
            .map_err(|e| DispatchError::Decode(e.to_string()))
            .and_then(|json| JSON::parse(&json).map_err(|e| DispatchError::Decode(describe(&e))))?;

        let returned = self
            .handler
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(action.as_str()),
                &JsValue::from_str(update.as_str()),
                &payload,
            )
            .map_err(|e| DispatchError::Rejected(describe(&e)))?;

        let reply = Promise::resolve(&returned);
        let marker = Object::new();
        let reply = match self.timeout_ms {
            Some(ms) => Self::with_timeout(reply, ms, &marker),
            None => reply,
        };

        match JsFuture::from(reply).await {
            Ok(value) if Object::is(&value, &marker) => Err(DispatchError::TimedOut(self.timeout_ms.unwrap_or_default())),
            Ok(value) => decode(value),
            Err(e) => Err(DispatchError::Rejected(describe(&e))),
        }
    }
}
