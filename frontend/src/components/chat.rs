use leptos::ev;
use leptos::prelude::*;

use crate::models::{clock_time, difficulty_accent, Message};
use crate::state::AppState;

/// Tutor chat: header, transcript (or greeting), and input.
#[component]
pub fn ChatTutor() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="chat-area">
            // Error banner
            {move || {
                state.error.get().map(|err| {
                    view! {
                        <div class="error-banner">{err}</div>
                    }
                })
            }}

            <ChatHeader />

            // Messages
            <div class="messages-container">
                {move || {
                    if state.messages.get().is_empty() {
                        view! { <EmptyState /> }.into_any()
                    } else {
                        view! {
                            <For
                                each=move || state.messages.get()
                                key=|m| m.id
                                let:msg
                            >
                                <MessageBubble message=msg />
                            </For>
                            // Assistant is composing
                            {move || {
                                state.composing.get().then(|| {
                                    view! {
                                        <div class="message assistant typing">
                                            <span class="dot" />
                                            <span class="dot" />
                                            <span class="dot" />
                                        </div>
                                    }
                                })
                            }}
                        }.into_any()
                    }
                }}
            </div>

            <ChatInput />
        </main>
    }
}

#[component]
fn ChatHeader() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="chat-header">
            <div class="chat-title">
                <h1>{move || state.subject.get().map(|s| s.headline).unwrap_or_default()}</h1>
                <p>{move || state.subject.get().map(|s| s.tagline).unwrap_or_default()}</p>
            </div>
            <button
                class="clear-btn"
                on:click=move |_| state.clear()
                disabled=move || state.messages.get().is_empty()
            >
                "Clear"
            </button>
        </div>
    }
}

/// Shown while the transcript is empty: selected note card, copy, and prompts.
#[component]
fn EmptyState() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="empty-state">
            {move || {
                state.selected_note.get().map(|note| {
                    let badge = format!("badge {}", difficulty_accent(&note.difficulty));
                    view! {
                        <div class="note-card selected">
                            <h4>{note.title}</h4>
                            <span class="meta">{format!("{} • {} pages", note.topic, note.pages)}</span>
                            <span class=badge>{note.difficulty}</span>
                        </div>
                    }
                })
            }}
            {move || {
                state.greeting.get().map(|g| {
                    view! {
                        <h3>{g.heading}</h3>
                        <p>{g.body}</p>
                    }
                })
            }}
            <div class="prompt-grid">
                <For
                    each=move || state.subject.get().map(|s| s.suggested_prompts).unwrap_or_default()
                    key=|p| p.clone()
                    let:prompt
                >
                    {
                        let text = prompt.clone();
                        view! {
                            <button class="prompt" on:click=move |_| state.select_prompt(text.clone())>
                                {prompt}
                            </button>
                        }
                    }
                </For>
            </div>
        </div>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(message: Message) -> impl IntoView {
    let css_class = if message.is_user() {
        "message user"
    } else {
        "message assistant"
    };

    view! {
        <div class=css_class>
            <div class="role-label">{message.role.clone()}</div>
            <div class="content">{message.content.clone()}</div>
            <span class="time">{clock_time(&message.created_at)}</span>
        </div>
    }
}

/// Textarea with send button. Enter sends, Shift+Enter inserts a newline.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            state.send();
        }
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder=move || state.placeholder.get()
                    prop:value=move || state.input.get()
                    on:input=move |ev| {
                        state.set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                />
                <button
                    class="send-btn"
                    on:click=move |_| state.send()
                    disabled=move || !state.can_send()
                >
                    {move || if state.composing.get() { "Thinking…" } else { "Send" }}
                </button>
            </div>
        </div>
    }
}
