use leptos::prelude::*;

use crate::models::RecentSession;
use crate::state::AppState;

fn age_label(session: &RecentSession) -> String {
    match session.days_ago {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n => format!("{n} days ago"),
    }
}

/// Sidebar showing the current tutor, the subject switcher, and recent chats.
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>
                    {move || {
                        state
                            .subject
                            .get()
                            .map(|s| format!("{} {}", s.icon, s.tutor_name))
                            .unwrap_or_else(|| "Study Tutor".to_string())
                    }}
                </h2>
                <button class="new-chat-btn" on:click=move |_| state.new_chat()>
                    "+ New Chat"
                </button>
            </div>

            <SubjectSwitcher />

            <h3 class="section-label">"Recent Chats"</h3>
            <div class="conversation-list">
                <For
                    each=move || state.subject.get().map(|s| s.recent_sessions).unwrap_or_default()
                    key=|r| r.title.clone()
                    let:recent
                >
                    <div class="conversation-item">
                        <span class="title">{recent.title.clone()}</span>
                        <span class="preview">{recent.last_message.clone()}</span>
                        <span class="age">{age_label(&recent)}</span>
                    </div>
                </For>
            </div>
        </aside>
    }
}

/// One tile per subject; picking one opens a fresh session for it.
#[component]
fn SubjectSwitcher() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="subject-switcher">
            <h3 class="section-label">"Switch Subject"</h3>
            <For
                each=move || state.subjects.get()
                key=|s| s.id.clone()
                let:subject
            >
                {
                    let id_active = subject.id.clone();
                    let accent = format!("subject-tile {}", subject.accent);
                    let label = format!("{} {}", subject.icon, subject.name);
                    let picked = subject.clone();
                    view! {
                        <button
                            class=accent
                            class:active=move || {
                                state.subject.get().map(|s| s.id) == Some(id_active.clone())
                            }
                            title=subject.description.clone()
                            on:click=move |_| state.open_subject(picked.clone())
                        >
                            {label}
                        </button>
                    }
                }
            </For>
        </div>
    }
}
