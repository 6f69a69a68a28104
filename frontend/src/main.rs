mod api;
mod components;
mod models;
mod state;
mod ws;

use leptos::mount::mount_to_body;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use components::chat::ChatTutor;
use components::notes::NotesPanel;
use components::sidebar::Sidebar;
use state::AppState;

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();

    // Load subjects and notes on mount; release the session on teardown,
    // including when the tab is closed or reloaded
    state.load_catalog();
    on_cleanup(move || state.release());

    let on_pagehide = Closure::<dyn Fn()>::new(move || state.release());
    if let Some(window) = web_sys::window() {
        if let Err(e) = window
            .add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref())
        {
            log::warn!("Failed to watch page unload: {e:?}");
        }
    }
    on_pagehide.forget();

    view! {
        <div class="app-container">
            <Sidebar />
            {move || {
                state
                    .subject
                    .get()
                    .filter(|s| s.uses_notes)
                    .map(|_| view! { <NotesPanel /> })
            }}
            <ChatTutor />
            {move || {
                state.notice.get().map(|notice| {
                    view! {
                        <div class="toast">
                            <strong>{notice.title}</strong>
                            <p>{notice.description}</p>
                        </div>
                    }
                })
            }}
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
