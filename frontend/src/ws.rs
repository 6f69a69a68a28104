use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use crate::api::ws_url;
use crate::models::WsEvent;

/// Opens the event feed of a session and invokes `on_event` for every event
/// the server pushes. `on_close` fires once if the feed drops without the
/// client asking for it. The caller owns the returned socket and must close
/// it with [`close_ws`] when the session view goes away.
pub fn subscribe(
    session_id: &str,
    on_event: impl Fn(WsEvent) + 'static,
    on_error: impl Fn(String) + Clone + 'static,
    on_close: impl Fn() + 'static,
) -> Option<WebSocket> {
    let url = ws_url(session_id);
    let ws = match WebSocket::new(&url) {
        Ok(ws) => ws,
        Err(e) => {
            on_error(format!("Failed to connect: {e:?}"));
            return None;
        }
    };
    ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

    // --- onmessage: dispatch WsEvent ---
    let report = on_error.clone();
    let onmessage = Closure::<dyn Fn(MessageEvent)>::new(move |ev: MessageEvent| {
        if let Some(text) = ev.data().as_string() {
            match serde_json::from_str::<WsEvent>(&text) {
                Ok(event) => on_event(event),
                Err(e) => report(format!("Parse error: {e}")),
            }
        }
    });
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    // --- onerror ---
    let onerror = Closure::<dyn Fn()>::new(move || {
        on_error("Event feed connection error".to_string());
    });
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    // --- onclose ---
    let onclose = Closure::<dyn Fn(CloseEvent)>::new(move |ev: CloseEvent| {
        log::warn!("Event feed closed (code {}, clean: {})", ev.code(), ev.was_clean());
        on_close();
    });
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    Some(ws)
}

/// Close a WebSocket connection gracefully.
pub fn close_ws(ws: &WebSocket) {
    ws.set_onmessage(None);
    ws.set_onerror(None);
    ws.set_onclose(None);
    let _ = ws.close();
}
