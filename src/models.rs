use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session message identifier. Assigned from a counter that only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(id: MessageId, role: MessageRole, content: String) -> Self {
        Self { id, role, content, created_at: Utc::now() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A study note; the topic a session can be focused on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub pages: u32,
}

/// Toast-style notice shown when tutoring starts on a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

/// Copy shown while the transcript is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub heading: String,
    pub body: String,
}

// ── API payloads ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Explicit text to send; when absent the session's input buffer is sent.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectNoteRequest {
    #[serde(default)]
    pub note_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteQuery {
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub subject: String,
    pub phase: Phase,
    pub composing: bool,
    pub input: String,
    pub can_send: bool,
    pub placeholder: String,
    pub greeting: Greeting,
    pub selected_note: Option<Note>,
    pub tutoring_started: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub accepted: bool,
    pub message: Option<Message>,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub notice: Option<Notice>,
}

/// State change pushed to WebSocket subscribers of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended { message: Message },
    ComposingChanged { composing: bool },
    Cleared,
    InputChanged { input: String },
    NoteSelected { note: Option<Note>, placeholder: String, greeting: Greeting },
    TutoringStarted { notice: Notice },
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn event_is_tagged_by_type() {
        let json = serde_json::to_value(SessionEvent::ComposingChanged { composing: true }).unwrap();
        assert_eq!(json["type"], "composing_changed");
        assert_eq!(json["composing"], true);

        let json = serde_json::to_value(SessionEvent::Cleared).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "cleared" }));
    }

    #[test]
    fn submit_request_text_is_optional() {
        let req: SubmitRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_none());
    }

    #[test]
    fn difficulty_serializes_by_name() {
        assert_eq!(serde_json::to_string(&Difficulty::Advanced).unwrap(), "\"Advanced\"");
        assert_eq!(Difficulty::Intermediate.to_string(), "Intermediate");
    }
}
