//! Tutoring chat session state.
//!
//! A session owns the transcript, the input buffer and the composing flag of
//! one tutor view. It is plain data: the deferred reply is scheduled by the
//! caller, which holds on to the [`ReplyTicket`] handed out by a successful
//! submission and redeems it with [`TutoringSession::deliver_reply`].
//!
//! Two phases exist. `Idle` accepts submissions; `AwaitingReply` rejects
//! them until the ticket is redeemed or the transcript is cleared. Clearing
//! advances the session epoch so that a ticket issued before the clear can
//! no longer append to the emptied transcript.

use serde::{Deserialize, Serialize};

use crate::catalog::subject_catalog::SubjectDescriptor;
use crate::models::{Greeting, Message, MessageId, MessageRole, Note, Notice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingReply,
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Empty or whitespace-only text.
    Blank,
    /// A reply is still pending.
    Busy,
}

/// Claim on the one reply owed for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTicket {
    epoch: u64,
    question: String,
}

impl ReplyTicket {
    pub fn question(&self) -> &str {
        &self.question
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub message: Message,
    pub ticket: ReplyTicket,
}

#[derive(Debug, Clone)]
pub struct TutoringSession {
    subject: &'static SubjectDescriptor,
    messages: Vec<Message>,
    input: String,
    phase: Phase,
    selected_note: Option<Note>,
    tutoring_started: bool,
    next_id: u64,
    epoch: u64,
}

impl TutoringSession {
    pub fn new(subject: &'static SubjectDescriptor) -> Self {
        Self {
            subject,
            messages: Vec::new(),
            input: String::new(),
            phase: Phase::Idle,
            selected_note: None,
            tutoring_started: false,
            next_id: 1,
            epoch: 0,
        }
    }

    pub fn subject(&self) -> &'static SubjectDescriptor {
        self.subject
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_composing(&self) -> bool {
        self.phase == Phase::AwaitingReply
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected_note.as_ref()
    }

    pub fn tutoring_started(&self) -> bool {
        self.tutoring_started
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Fills the input buffer with a suggested prompt without sending it.
    pub fn select_suggested_prompt(&mut self, text: impl Into<String>) {
        self.set_input(text);
    }

    /// Switching notes resets the "tutoring started" flag.
    pub fn select_note(&mut self, note: Option<Note>) {
        self.selected_note = note;
        self.tutoring_started = false;
    }

    /// Marks tutoring as started on the selected note. Does nothing without one.
    pub fn start_tutoring(&mut self) -> Option<Notice> {
        let note = self.selected_note.as_ref()?;
        self.tutoring_started = true;
        Some(Notice {
            title: format!("{} {} Tutoring Started!", self.subject.icon, self.subject.name),
            description: format!("Now teaching: {}", note.title),
        })
    }

    pub fn can_send(&self) -> bool {
        !self.input.trim().is_empty() && !self.is_composing()
    }

    /// Sends the current input buffer.
    pub fn submit_input(&mut self) -> Result<Submission, Rejection> {
        let text = self.input.clone();
        self.submit(&text)
    }

    /// Appends the trimmed text as a user message and enters `AwaitingReply`.
    pub fn submit(&mut self, text: &str) -> Result<Submission, Rejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::Blank);
        }
        if self.is_composing() {
            return Err(Rejection::Busy);
        }

        let message = self.push(MessageRole::User, text.to_string());
        self.input.clear();
        self.phase = Phase::AwaitingReply;
        self.epoch += 1;

        Ok(Submission {
            message,
            ticket: ReplyTicket { epoch: self.epoch, question: text.to_string() },
        })
    }

    /// Appends the assistant reply owed for `ticket` and returns to `Idle`.
    /// Returns `None` when the ticket is stale (cleared or already redeemed).
    pub fn deliver_reply(&mut self, ticket: &ReplyTicket, content: String) -> Option<Message> {
        if self.phase != Phase::AwaitingReply || ticket.epoch != self.epoch {
            return None;
        }
        let message = self.push(MessageRole::Assistant, content);
        self.phase = Phase::Idle;
        Some(message)
    }

    /// Empties the transcript and invalidates any outstanding ticket.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.phase = Phase::Idle;
        self.epoch += 1;
    }

    pub fn placeholder(&self) -> String {
        match &self.selected_note {
            Some(note) => format!("Ask about {}...", note.title),
            None => "Ask about your notes...".to_string(),
        }
    }

    pub fn greeting(&self) -> Greeting {
        match &self.selected_note {
            Some(note) => Greeting {
                heading: "Ready to Learn!".to_string(),
                body: format!(
                    "Ask questions about {} and I'll help you understand.",
                    note.title
                ),
            },
            None => Greeting {
                heading: "Start Learning".to_string(),
                body: "Select a note from the left panel to get started, or ask a general question."
                    .to_string(),
            },
        }
    }

    fn push(&mut self, role: MessageRole, content: String) -> Message {
        let message = Message::new(MessageId(self.next_id), role, content);
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::catalog::note_catalog::NoteCatalog;
    use crate::catalog::subject_catalog::SubjectCatalog;

    fn session(subject: &str) -> TutoringSession {
        TutoringSession::new(SubjectCatalog::new().find_by_id(subject).unwrap())
    }

    fn note(id: &str) -> Note {
        NoteCatalog::new().find_by_id(id).unwrap().clone()
    }

    #[test]
    fn starts_idle_and_empty() {
        let s = session("ai");
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.is_composing());
        assert!(s.messages().is_empty());
        assert_eq!(s.input(), "");
    }

    #[test]
    fn submit_appends_user_message_and_awaits_reply() {
        let mut s = session("ai");
        s.set_input("What is a derivative?");

        let submission = s.submit_input().unwrap();

        assert_eq!(s.messages().len(), 1);
        assert_eq!(submission.message.role, MessageRole::User);
        assert_eq!(submission.message.content, "What is a derivative?");
        assert_eq!(submission.ticket.question(), "What is a derivative?");
        assert!(s.is_composing());
        assert_eq!(s.phase(), Phase::AwaitingReply);
        assert_eq!(s.input(), "");
    }

    #[test]
    fn submitted_text_is_trimmed() {
        let mut s = session("python");
        let submission = s.submit("  hello\nworld \n").unwrap();
        assert_eq!(submission.message.content, "hello\nworld");
    }

    #[test]
    fn blank_submissions_are_ignored() {
        let mut s = session("ai");
        assert_eq!(s.submit("").unwrap_err(), Rejection::Blank);
        assert_eq!(s.submit("   ").unwrap_err(), Rejection::Blank);
        assert_eq!(s.submit("\n\t").unwrap_err(), Rejection::Blank);
        assert!(s.messages().is_empty());
        assert!(!s.is_composing());
    }

    #[test]
    fn overlapping_submission_is_rejected() {
        let mut s = session("ai");
        s.submit("first").unwrap();
        s.set_input("second");

        assert_eq!(s.submit_input().unwrap_err(), Rejection::Busy);
        assert_eq!(s.messages().len(), 1);
        // the rejected text stays in the buffer
        assert_eq!(s.input(), "second");
    }

    #[test]
    fn delivering_reply_returns_to_idle() {
        let mut s = session("ai");
        let submission = s.submit("What is a derivative?").unwrap();

        let reply = s.deliver_reply(&submission.ticket, "answer".into()).unwrap();

        assert_eq!(s.messages().len(), 2);
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(s.messages()[1].role, MessageRole::Assistant);
        assert!(!s.is_composing());
    }

    #[test]
    fn ticket_is_redeemed_once() {
        let mut s = session("ai");
        let submission = s.submit("q").unwrap();
        assert!(s.deliver_reply(&submission.ticket, "a".into()).is_some());
        assert!(s.deliver_reply(&submission.ticket, "a".into()).is_none());
        assert_eq!(s.messages().len(), 2);
    }

    #[test]
    fn clear_resets_transcript_and_flag() {
        let mut s = session("ai");
        let submission = s.submit("q").unwrap();
        s.deliver_reply(&submission.ticket, "a".into()).unwrap();
        s.submit("again").unwrap();

        s.clear();

        assert!(s.messages().is_empty());
        assert!(!s.is_composing());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn reply_issued_before_clear_is_dropped() {
        let mut s = session("ai");
        let stale = s.submit("q").unwrap().ticket;
        s.clear();

        assert!(s.deliver_reply(&stale, "late".into()).is_none());
        assert!(s.messages().is_empty());

        // a fresh submission after the clear is not satisfied by the old ticket
        let fresh = s.submit("q2").unwrap().ticket;
        assert!(s.deliver_reply(&stale, "late".into()).is_none());
        assert!(s.is_composing());
        assert!(s.deliver_reply(&fresh, "on time".into()).is_some());
        assert_eq!(s.messages().len(), 2);
    }

    #[test]
    fn ids_stay_unique_across_clear_cycles() {
        let mut s = session("ai");
        let mut ids = HashSet::new();
        for round in 0..3 {
            let submission = s.submit(&format!("question {round}")).unwrap();
            let reply = s.deliver_reply(&submission.ticket, "a".into()).unwrap();
            assert!(ids.insert(submission.message.id));
            assert!(ids.insert(reply.id));
            s.clear();
        }
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn ids_increase_with_insertion_order() {
        let mut s = session("ai");
        let submission = s.submit("q").unwrap();
        let reply = s.deliver_reply(&submission.ticket, "a".into()).unwrap();
        assert!(reply.id > submission.message.id);
    }

    #[test]
    fn suggested_prompt_only_fills_input() {
        let mut s = session("ai");
        s.select_suggested_prompt("Explain neural networks");
        assert_eq!(s.input(), "Explain neural networks");
        assert!(s.messages().is_empty());
        assert!(!s.is_composing());
    }

    #[test]
    fn can_send_requires_text_and_idle() {
        let mut s = session("ai");
        assert!(!s.can_send());
        s.set_input("  ");
        assert!(!s.can_send());
        s.set_input("hi");
        assert!(s.can_send());
        s.submit_input().unwrap();
        s.set_input("more");
        assert!(!s.can_send());
    }

    #[test]
    fn placeholder_and_greeting_follow_selected_note() {
        let mut s = session("chemistry");
        assert_eq!(s.placeholder(), "Ask about your notes...");
        assert_eq!(s.greeting().heading, "Start Learning");

        s.select_note(Some(note("4")));
        assert_eq!(s.placeholder(), "Ask about Organic Chemistry Fundamentals...");
        assert_eq!(s.greeting().heading, "Ready to Learn!");
        assert_eq!(
            s.greeting().body,
            "Ask questions about Organic Chemistry Fundamentals and I'll help you understand."
        );
    }

    #[test]
    fn start_tutoring_needs_a_note() {
        let mut s = session("chemistry");
        assert!(s.start_tutoring().is_none());
        assert!(!s.tutoring_started());

        s.select_note(Some(note("4")));
        let notice = s.start_tutoring().unwrap();
        assert_eq!(notice.title, "🧪 Chemistry Tutoring Started!");
        assert_eq!(notice.description, "Now teaching: Organic Chemistry Fundamentals");
        assert!(s.tutoring_started());

        s.select_note(Some(note("5")));
        assert!(!s.tutoring_started());
    }

    #[test]
    fn selecting_note_keeps_transcript() {
        let mut s = session("mechanical");
        s.submit("q").unwrap();
        s.select_note(Some(note("5")));
        assert_eq!(s.messages().len(), 1);
        assert!(s.is_composing());
    }
}
