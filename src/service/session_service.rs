use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::SimulatedTutor;
use crate::catalog::note_catalog::NoteCatalog;
use crate::catalog::subject_catalog::SubjectCatalog;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{
    Notice, SessionEvent, SessionSnapshot, SessionSummary, SubmitResponse,
};
use crate::session::{ReplyTicket, TutoringSession};

/// A session plus the resources tied to its lifetime: the pending reply
/// task and the event channel. Dropping it aborts the pending reply.
///
/// Lock order: `state` before `pending`.
struct LiveSession {
    id: Uuid,
    state: Mutex<TutoringSession>,
    pending: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<SessionEvent>,
    last_active: Mutex<Instant>,
}

impl LiveSession {
    fn new(id: Uuid, session: TutoringSession, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer);
        Self {
            id,
            state: Mutex::new(session),
            pending: Mutex::new(None),
            events,
            last_active: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_active.lock() = Instant::now();
    }

    /// Nobody is watching the feed and no request has arrived for `ttl`.
    fn is_idle(&self, ttl: Duration) -> bool {
        self.events.receiver_count() == 0 && self.last_active.lock().elapsed() > ttl
    }

    /// Having no subscribers is normal; events are then discarded.
    fn publish(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(self.id, &self.state.lock())
    }

    /// Redeems the ticket; stale tickets are dropped without a trace in the transcript.
    fn deliver(&self, tutor: &SimulatedTutor, ticket: &ReplyTicket) {
        let mut state = self.state.lock();
        let content = tutor.compose(state.subject(), state.selected_note(), ticket.question());
        match state.deliver_reply(ticket, content) {
            Some(message) => {
                info!(session_id = %self.id, message_id = %message.id, "simulated reply delivered");
                self.publish(SessionEvent::MessageAppended { message });
                self.publish(SessionEvent::ComposingChanged { composing: false });
            }
            None => debug!(session_id = %self.id, "dropping stale reply"),
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}

fn snapshot_of(id: Uuid, state: &TutoringSession) -> SessionSnapshot {
    SessionSnapshot {
        id: id.to_string(),
        subject: state.subject().id.to_string(),
        phase: state.phase(),
        composing: state.is_composing(),
        input: state.input().to_string(),
        can_send: state.can_send(),
        placeholder: state.placeholder(),
        greeting: state.greeting(),
        selected_note: state.selected_note().cloned(),
        tutoring_started: state.tutoring_started(),
        messages: state.messages().to_vec(),
    }
}

/// Registry of live tutoring sessions.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<LiveSession>>>>,
    subjects: SubjectCatalog,
    notes: NoteCatalog,
    tutor: SimulatedTutor,
    max_message_length: usize,
    event_buffer: usize,
    idle_ttl: Duration,
}

impl SessionService {
    pub fn new(
        config: &AppConfig,
        subjects: SubjectCatalog,
        notes: NoteCatalog,
        tutor: SimulatedTutor,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            subjects,
            notes,
            tutor,
            max_message_length: config.max_message_length,
            event_buffer: config.event_buffer,
            idle_ttl: config.session_idle_ttl,
        }
    }

    pub fn subjects(&self) -> &SubjectCatalog {
        &self.subjects
    }

    pub fn notes(&self) -> &NoteCatalog {
        &self.notes
    }

    pub fn create(&self, subject_id: &str) -> Result<SessionSnapshot, AppError> {
        let subject = self
            .subjects
            .find_by_id(subject_id)
            .ok_or_else(|| AppError::SubjectNotFound { id: subject_id.to_string() })?;

        let id = Uuid::new_v4();
        let live = Arc::new(LiveSession::new(id, TutoringSession::new(subject), self.event_buffer));
        let snapshot = live.snapshot();
        self.sessions.write().insert(id, live);

        info!(session_id = %id, subject = subject.id, "session created");
        Ok(snapshot)
    }

    pub fn list(&self) -> Vec<SessionSummary> {
        self.sessions
            .read()
            .values()
            .map(|live| SessionSummary {
                id: live.id.to_string(),
                subject: live.state.lock().subject().id.to_string(),
            })
            .collect()
    }

    pub fn snapshot(&self, id: &str) -> Result<SessionSnapshot, AppError> {
        Ok(self.get(id)?.snapshot())
    }

    pub fn subscribe(&self, id: &str) -> Result<broadcast::Receiver<SessionEvent>, AppError> {
        Ok(self.get(id)?.events.subscribe())
    }

    pub fn set_input(&self, id: &str, text: String) -> Result<SessionSnapshot, AppError> {
        let live = self.get(id)?;
        self.check_length(&text)?;
        let mut state = live.state.lock();
        state.set_input(text);
        live.publish(SessionEvent::InputChanged { input: state.input().to_string() });
        Ok(snapshot_of(live.id, &state))
    }

    pub fn select_prompt(&self, id: &str, text: String) -> Result<SessionSnapshot, AppError> {
        let live = self.get(id)?;
        self.check_length(&text)?;
        let mut state = live.state.lock();
        state.select_suggested_prompt(text);
        live.publish(SessionEvent::InputChanged { input: state.input().to_string() });
        Ok(snapshot_of(live.id, &state))
    }

    /// `None` deselects the current note.
    pub fn select_note(&self, id: &str, note_id: Option<&str>) -> Result<SessionSnapshot, AppError> {
        let live = self.get(id)?;
        let note = match note_id {
            Some(note_id) => Some(
                self.notes
                    .find_by_id(note_id)
                    .cloned()
                    .ok_or_else(|| AppError::NoteNotFound { id: note_id.to_string() })?,
            ),
            None => None,
        };

        let mut state = live.state.lock();
        state.select_note(note);
        live.publish(SessionEvent::NoteSelected {
            note: state.selected_note().cloned(),
            placeholder: state.placeholder(),
            greeting: state.greeting(),
        });
        Ok(snapshot_of(live.id, &state))
    }

    pub fn start_tutoring(&self, id: &str) -> Result<Option<Notice>, AppError> {
        let live = self.get(id)?;
        let notice = live.state.lock().start_tutoring();
        match &notice {
            Some(notice) => {
                info!(session_id = %live.id, "{}", notice.description);
                live.publish(SessionEvent::TutoringStarted { notice: notice.clone() });
            }
            None => debug!(session_id = %live.id, "start ignored: no note selected"),
        }
        Ok(notice)
    }

    /// Sends `text`, or the input buffer when `text` is `None`. Blank text and
    /// submissions made while a reply is pending are ignored, not errors.
    pub fn submit(&self, id: &str, text: Option<String>) -> Result<SubmitResponse, AppError> {
        let live = self.get(id)?;
        if let Some(text) = &text {
            self.check_length(text)?;
        }

        let mut state = live.state.lock();
        let outcome = match text {
            Some(text) => state.submit(&text),
            None => state.submit_input(),
        };

        match outcome {
            Err(rejection) => {
                debug!(session_id = %live.id, ?rejection, "submission ignored");
                Ok(SubmitResponse {
                    accepted: false,
                    message: None,
                    snapshot: snapshot_of(live.id, &state),
                })
            }
            Ok(submission) => {
                debug!(session_id = %live.id, message_id = %submission.message.id, "user message appended");
                live.publish(SessionEvent::MessageAppended { message: submission.message.clone() });
                live.publish(SessionEvent::InputChanged { input: String::new() });
                live.publish(SessionEvent::ComposingChanged { composing: true });
                // Stored before the state lock is released, so a concurrent
                // clear always finds and cancels this reply.
                self.schedule_reply(&live, submission.ticket);
                Ok(SubmitResponse {
                    accepted: true,
                    message: Some(submission.message),
                    snapshot: snapshot_of(live.id, &state),
                })
            }
        }
    }

    /// Empties the transcript and cancels a pending reply.
    pub fn clear(&self, id: &str) -> Result<SessionSnapshot, AppError> {
        let live = self.get(id)?;
        let mut state = live.state.lock();
        live.cancel_pending();
        let was_composing = state.is_composing();
        state.clear();
        live.publish(SessionEvent::Cleared);
        if was_composing {
            live.publish(SessionEvent::ComposingChanged { composing: false });
        }
        debug!(session_id = %live.id, "transcript cleared");
        Ok(snapshot_of(live.id, &state))
    }

    /// Tears the session down; its pending reply never fires.
    pub fn close(&self, id: &str) -> Result<(), AppError> {
        let uuid = parse_id(id)?;
        let live = self
            .sessions
            .write()
            .remove(&uuid)
            .ok_or_else(|| AppError::SessionNotFound { id: id.to_string() })?;

        live.cancel_pending();
        live.publish(SessionEvent::Closed);
        info!(session_id = %uuid, "session closed");
        Ok(())
    }

    /// Closes every session that has no event subscriber and has seen no
    /// request for longer than the idle TTL. Returns how many were closed.
    pub fn reap_idle(&self) -> usize {
        let reaped: Vec<Arc<LiveSession>> = {
            let mut sessions = self.sessions.write();
            let idle: Vec<Uuid> = sessions
                .values()
                .filter(|live| live.is_idle(self.idle_ttl))
                .map(|live| live.id)
                .collect();
            idle.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for live in &reaped {
            live.cancel_pending();
            live.publish(SessionEvent::Closed);
            info!(session_id = %live.id, "idle session reaped");
        }
        reaped.len()
    }

    /// Sweeps idle sessions in the background for as long as the handle lives.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        let svc = self.clone();
        let period = (self.idle_ttl / 2).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reaped = svc.reap_idle();
                if reaped > 0 {
                    debug!(reaped, remaining = svc.sessions.read().len(), "idle sweep finished");
                }
            }
        })
    }

    fn schedule_reply(&self, live: &Arc<LiveSession>, ticket: ReplyTicket) {
        let session: Weak<LiveSession> = Arc::downgrade(live);
        let tutor = self.tutor.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(tutor.latency()).await;
            match session.upgrade() {
                Some(live) => live.deliver(&tutor, &ticket),
                None => warn!("reply timer fired for a session that no longer exists"),
            }
        });

        // Only called for an accepted submission, so any previous reply has already been delivered.
        if let Some(previous) = live.pending.lock().replace(handle) {
            previous.abort();
        }
    }

    fn get(&self, id: &str) -> Result<Arc<LiveSession>, AppError> {
        let uuid = parse_id(id)?;
        let live = self
            .sessions
            .read()
            .get(&uuid)
            .cloned()
            .ok_or_else(|| AppError::SessionNotFound { id: id.to_string() })?;
        live.touch();
        Ok(live)
    }

    fn check_length(&self, text: &str) -> Result<(), AppError> {
        let actual_length = text.chars().count();
        if actual_length > self.max_message_length {
            return Err(AppError::FieldTooLong {
                field_name: "text".to_string(),
                max_length: self.max_message_length,
                actual_length,
            });
        }
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::SessionNotFound { id: id.to_string() })
}
