use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::WebSocket;

use crate::api;
use crate::models::{Greeting, Message, Note, Notice, SessionSnapshot, Subject, WsEvent};
use crate::ws;

/// How long the "tutoring started" notice stays on screen.
const NOTICE_MS: u32 = 4_000;

/// Poll interval for the session snapshot while the event feed is down.
const RESYNC_MS: u32 = 1_500;

/// A pending reply can only be observed by polling when the feed is gone.
fn needs_poll(composing: bool, feed_open: bool) -> bool {
    composing && !feed_open
}

/// Shared application state, provided via Leptos context.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub subjects: ReadSignal<Vec<Subject>>,
    pub subject: ReadSignal<Option<Subject>>,
    pub session_id: ReadSignal<Option<String>>,
    pub messages: ReadSignal<Vec<Message>>,
    pub input: ReadSignal<String>,
    pub composing: ReadSignal<bool>,
    pub placeholder: ReadSignal<String>,
    pub greeting: ReadSignal<Option<Greeting>>,
    pub selected_note: ReadSignal<Option<Note>>,
    pub notes: ReadSignal<Vec<Note>>,
    pub note_subjects: ReadSignal<Vec<String>>,
    pub note_filter: ReadSignal<Option<String>>,
    pub notice: ReadSignal<Option<Notice>>,
    pub error: ReadSignal<Option<String>>,

    // --- Write signals (for mutating state) ---
    set_subjects: WriteSignal<Vec<Subject>>,
    set_subject: WriteSignal<Option<Subject>>,
    set_session_id: WriteSignal<Option<String>>,
    set_messages: WriteSignal<Vec<Message>>,
    pub set_input: WriteSignal<String>,
    set_composing: WriteSignal<bool>,
    set_placeholder: WriteSignal<String>,
    set_greeting: WriteSignal<Option<Greeting>>,
    set_selected_note: WriteSignal<Option<Note>>,
    set_notes: WriteSignal<Vec<Note>>,
    set_note_subjects: WriteSignal<Vec<String>>,
    pub set_note_filter: WriteSignal<Option<String>>,
    set_notice: WriteSignal<Option<Notice>>,
    set_error: WriteSignal<Option<String>>,

    /// Event feed of the current session.
    socket: StoredValue<Option<WebSocket>, LocalStorage>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (subjects, set_subjects) = signal(Vec::<Subject>::new());
        let (subject, set_subject) = signal(None::<Subject>);
        let (session_id, set_session_id) = signal(None::<String>);
        let (messages, set_messages) = signal(Vec::<Message>::new());
        let (input, set_input) = signal(String::new());
        let (composing, set_composing) = signal(false);
        let (placeholder, set_placeholder) = signal(String::new());
        let (greeting, set_greeting) = signal(None::<Greeting>);
        let (selected_note, set_selected_note) = signal(None::<Note>);
        let (notes, set_notes) = signal(Vec::<Note>::new());
        let (note_subjects, set_note_subjects) = signal(Vec::<String>::new());
        let (note_filter, set_note_filter) = signal(None::<String>);
        let (notice, set_notice) = signal(None::<Notice>);
        let (error, set_error) = signal(None::<String>);

        let state = Self {
            subjects,
            subject,
            session_id,
            messages,
            input,
            composing,
            placeholder,
            greeting,
            selected_note,
            notes,
            note_subjects,
            note_filter,
            notice,
            error,
            set_subjects,
            set_subject,
            set_session_id,
            set_messages,
            set_input,
            set_composing,
            set_placeholder,
            set_greeting,
            set_selected_note,
            set_notes,
            set_note_subjects,
            set_note_filter,
            set_notice,
            set_error,
            socket: StoredValue::new_local(None),
        };

        provide_context(state);
        state
    }

    /// Load subjects and notes, then open the first subject.
    pub fn load_catalog(&self) {
        let state = *self;
        spawn_local(async move {
            match api::fetch_subjects().await {
                Ok(subjects) => {
                    let first = subjects.first().cloned();
                    state.set_subjects.set(subjects);
                    if let Some(subject) = first {
                        state.open_subject(subject);
                    }
                }
                Err(e) => state.fail(e),
            }
        });
        spawn_local(async move {
            match api::fetch_notes().await {
                Ok(notes) => state.set_notes.set(notes),
                Err(e) => state.fail(e),
            }
            match api::fetch_note_subjects().await {
                Ok(labels) => state.set_note_subjects.set(labels),
                Err(e) => state.fail(e),
            }
        });
    }

    /// Notes visible under the current filter.
    pub fn filtered_notes(&self) -> Vec<Note> {
        let filter = self.note_filter.get();
        self.notes
            .get()
            .into_iter()
            .filter(|n| filter.as_ref().map_or(true, |f| &n.subject == f))
            .collect()
    }

    pub fn can_send(&self) -> bool {
        !self.input.get().trim().is_empty() && !self.composing.get()
    }

    /// Replace the current session with a fresh one for `subject`.
    pub fn open_subject(&self, subject: Subject) {
        let state = *self;
        let previous = self.session_id.get_untracked();
        self.disconnect();
        self.set_subject.set(Some(subject.clone()));
        self.set_session_id.set(None);
        self.set_messages.set(Vec::new());
        self.set_composing.set(false);
        self.set_error.set(None);

        spawn_local(async move {
            if let Some(old) = previous {
                if let Err(e) = api::close_session(&old).await {
                    log::warn!("Failed to close session {old}: {e}");
                }
            }
            match api::create_session(&subject.id).await {
                Ok(snapshot) => {
                    state.apply_snapshot(snapshot);
                    state.connect();
                }
                Err(e) => state.fail(e),
            }
        });
    }

    /// Start over on the current subject.
    pub fn new_chat(&self) {
        if let Some(subject) = self.subject.get_untracked() {
            self.open_subject(subject);
        }
    }

    pub fn send(&self) {
        let text = self.input.get_untracked();
        if text.trim().is_empty() || self.composing.get_untracked() {
            return;
        }
        let Some(id) = self.session_id.get_untracked() else { return };
        let state = *self;
        self.set_input.set(String::new());

        spawn_local(async move {
            match api::submit(&id, &text).await {
                Ok(resp) => {
                    if !resp.accepted {
                        log::debug!("Submission ignored by the session");
                    }
                    let composing = resp.snapshot.composing;
                    state.apply_snapshot(resp.snapshot);
                    state.poll_while_offline(composing);
                }
                Err(e) => state.fail(e),
            }
        });
    }

    pub fn clear(&self) {
        let Some(id) = self.session_id.get_untracked() else { return };
        let state = *self;
        spawn_local(async move {
            match api::clear(&id).await {
                Ok(snapshot) => state.apply_snapshot(snapshot),
                Err(e) => state.fail(e),
            }
        });
    }

    pub fn select_prompt(&self, text: String) {
        self.set_input.set(text.clone());
        let Some(id) = self.session_id.get_untracked() else { return };
        let state = *self;
        spawn_local(async move {
            if let Err(e) = api::select_prompt(&id, &text).await {
                state.fail(e);
            }
        });
    }

    pub fn select_note(&self, note_id: Option<String>) {
        let Some(id) = self.session_id.get_untracked() else { return };
        let state = *self;
        spawn_local(async move {
            match api::select_note(&id, note_id).await {
                Ok(snapshot) => state.apply_snapshot(snapshot),
                Err(e) => state.fail(e),
            }
        });
    }

    pub fn start_tutoring(&self) {
        let Some(id) = self.session_id.get_untracked() else { return };
        let state = *self;
        spawn_local(async move {
            match api::start_tutoring(&id).await {
                Ok(resp) => {
                    if let Some(notice) = resp.notice {
                        state.show_notice(notice);
                    }
                }
                Err(e) => state.fail(e),
            }
        });
    }

    /// Close the event feed; called when the view is torn down.
    pub fn disconnect(&self) {
        self.socket.update_value(|socket| {
            if let Some(ws) = socket.take() {
                ws::close_ws(&ws);
            }
        });
    }

    /// Close the event feed and the server session; called on teardown and
    /// when the page is hidden for good.
    pub fn release(&self) {
        self.disconnect();
        if let Some(id) = self.session_id.try_get_untracked().flatten() {
            self.set_session_id.try_set(None);
            if !api::close_on_unload(&id) {
                log::warn!("Could not close session {id} on unload");
            }
        }
    }

    fn connect(&self) {
        let Some(id) = self.session_id.get_untracked() else { return };
        let state = *self;
        let socket = ws::subscribe(
            &id,
            move |event| state.handle_event(event),
            move |err| state.fail(format!("Event feed error: {err}")),
            move || state.feed_lost(),
        );
        let opened = socket.is_some();
        self.socket.set_value(socket);
        if !opened {
            self.resync();
        }
    }

    fn feed_open(&self) -> bool {
        self.socket.with_value(Option::is_some)
    }

    fn feed_lost(&self) {
        self.socket.set_value(None);
        self.resync();
    }

    /// Fetch the session snapshot over HTTP and keep polling while a reply
    /// is pending and no event feed will report it.
    fn resync(&self) {
        let Some(id) = self.session_id.get_untracked() else { return };
        let state = *self;
        spawn_local(async move {
            match api::fetch_session(&id).await {
                // the user may have switched sessions meanwhile
                Ok(snapshot) if snapshot.id == id
                    && state.session_id.get_untracked().as_deref() == Some(id.as_str()) =>
                {
                    let composing = snapshot.composing;
                    state.apply_snapshot(snapshot);
                    state.poll_while_offline(composing);
                }
                Ok(_) => {}
                Err(e) => state.fail(e),
            }
        });
    }

    fn poll_while_offline(&self, composing: bool) {
        if needs_poll(composing, self.feed_open()) {
            let state = *self;
            Timeout::new(RESYNC_MS, move || state.resync()).forget();
        }
    }

    fn handle_event(&self, event: WsEvent) {
        match event {
            WsEvent::MessageAppended { message } => self.set_messages.update(|msgs| {
                if !msgs.iter().any(|m| m.id == message.id) {
                    msgs.push(message);
                }
            }),
            WsEvent::ComposingChanged { composing } => self.set_composing.set(composing),
            WsEvent::Cleared => self.set_messages.set(Vec::new()),
            WsEvent::InputChanged { input } => self.set_input.set(input),
            WsEvent::NoteSelected { note, placeholder, greeting } => {
                self.set_selected_note.set(note);
                self.set_placeholder.set(placeholder);
                self.set_greeting.set(Some(greeting));
            }
            WsEvent::TutoringStarted { notice } => self.show_notice(notice),
            WsEvent::Closed => self.disconnect(),
        }
    }

    fn apply_snapshot(&self, snapshot: SessionSnapshot) {
        log::debug!("Session {} ({}) updated", snapshot.id, snapshot.subject);
        self.set_session_id.set(Some(snapshot.id));
        self.set_messages.set(snapshot.messages);
        self.set_composing.set(snapshot.composing);
        self.set_input.set(snapshot.input);
        self.set_placeholder.set(snapshot.placeholder);
        self.set_greeting.set(Some(snapshot.greeting));
        self.set_selected_note.set(snapshot.selected_note);
        if !snapshot.tutoring_started {
            self.set_notice.set(None);
        }
    }

    fn show_notice(&self, notice: Notice) {
        self.set_notice.set(Some(notice));
        let set_notice = self.set_notice;
        Timeout::new(NOTICE_MS, move || set_notice.set(None)).forget();
    }

    fn fail(&self, err: String) {
        log::error!("{err}");
        self.set_error.set(Some(err));
    }
}
