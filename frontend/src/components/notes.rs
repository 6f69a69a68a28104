use leptos::prelude::*;

use crate::models::difficulty_accent;
use crate::state::AppState;

/// Study notes panel: subject filter, note list, and the tutoring button.
/// Only rendered for notes-driven subjects.
#[component]
pub fn NotesPanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <aside class="notes-panel">
            <div class="notes-header">
                <h2>"Study Notes"</h2>
                <p>"Select a note to focus the tutor"</p>
            </div>

            <div class="filters">
                <button
                    class="badge"
                    class:active=move || state.note_filter.get().is_none()
                    on:click=move |_| state.set_note_filter.set(None)
                >
                    "All"
                </button>
                <For
                    each=move || state.note_subjects.get()
                    key=|label| label.clone()
                    let:label
                >
                    {
                        let active = label.clone();
                        let picked = label.clone();
                        view! {
                            <button
                                class="badge"
                                class:active=move || state.note_filter.get() == Some(active.clone())
                                on:click=move |_| state.set_note_filter.set(Some(picked.clone()))
                            >
                                {label}
                            </button>
                        }
                    }
                </For>
            </div>

            <div class="note-list">
                <For
                    each=move || state.filtered_notes()
                    key=|n| n.id.clone()
                    let:note
                >
                    {
                        let id_active = note.id.clone();
                        let id_click = note.id.clone();
                        let badge = format!("badge {}", difficulty_accent(&note.difficulty));
                        view! {
                            <button
                                class="note-card"
                                class:selected=move || {
                                    state.selected_note.get().map(|n| n.id) == Some(id_active.clone())
                                }
                                on:click=move |_| state.select_note(Some(id_click.clone()))
                            >
                                <span class="title">{note.title.clone()}</span>
                                <span class="meta">{format!("{} • {} pages", note.topic, note.pages)}</span>
                                <span class=badge>{note.difficulty.clone()}</span>
                            </button>
                        }
                    }
                </For>
            </div>

            <div class="notes-actions">
                <button
                    class="primary"
                    disabled=move || state.selected_note.get().is_none()
                    on:click=move |_| state.start_tutoring()
                >
                    "Use for Tutoring"
                </button>
                <button
                    class="ghost"
                    disabled=move || state.selected_note.get().is_none()
                    on:click=move |_| state.select_note(None)
                >
                    "Deselect"
                </button>
            </div>
        </aside>
    }
}
