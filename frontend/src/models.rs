use serde::{Deserialize, Serialize};

/// Matches the backend `Message` model.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub id: u64,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: String,
    pub pages: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RecentSession {
    pub title: String,
    pub last_message: String,
    pub days_ago: u32,
}

/// Matches the backend `SubjectDescriptor`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub title: String,
    pub tutor_name: String,
    pub headline: String,
    pub tagline: String,
    pub description: String,
    pub icon: String,
    pub accent: String,
    pub suggested_prompts: Vec<String>,
    pub recent_sessions: Vec<RecentSession>,
    pub uses_notes: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Greeting {
    pub heading: String,
    pub body: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub subject: String,
    pub composing: bool,
    pub input: String,
    pub placeholder: String,
    pub greeting: Greeting,
    pub selected_note: Option<Note>,
    pub tutoring_started: bool,
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SubmitResponse {
    pub accepted: bool,
    pub snapshot: SessionSnapshot,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StartResponse {
    pub notice: Option<Notice>,
}

/// Request bodies.
#[derive(Clone, Debug, Serialize)]
pub struct CreateSessionRequest {
    pub subject: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SelectNoteRequest {
    pub note_id: Option<String>,
}

/// Session event received over the WebSocket (internally tagged).
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    MessageAppended { message: Message },
    ComposingChanged { composing: bool },
    Cleared,
    InputChanged { input: String },
    NoteSelected { note: Option<Note>, placeholder: String, greeting: Greeting },
    TutoringStarted { notice: Notice },
    Closed,
}

/// `HH:MM` part of an RFC 3339 timestamp.
pub fn clock_time(created_at: &str) -> String {
    created_at.get(11..16).unwrap_or_default().to_string()
}

/// Badge accent for a difficulty label.
pub fn difficulty_accent(difficulty: &str) -> &'static str {
    match difficulty {
        "Beginner" => "emerald",
        "Intermediate" => "amber",
        "Advanced" => "rose",
        _ => "muted",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_takes_hours_and_minutes() {
        assert_eq!(clock_time("2026-10-18T09:05:33.120Z"), "09:05");
        assert_eq!(clock_time("bad"), "");
    }

    #[test]
    fn events_decode_by_tag() {
        let event: WsEvent =
            serde_json::from_str(r#"{"type":"composing_changed","composing":true}"#).unwrap();
        assert!(matches!(event, WsEvent::ComposingChanged { composing: true }));

        let event: WsEvent = serde_json::from_str(r#"{"type":"cleared"}"#).unwrap();
        assert!(matches!(event, WsEvent::Cleared));
    }

    #[test]
    fn note_selection_carries_the_greeting() {
        let raw = r#"{
            "type": "note_selected",
            "note": null,
            "placeholder": "Ask about your notes...",
            "greeting": { "heading": "Start Learning", "body": "Select a note." }
        }"#;
        match serde_json::from_str::<WsEvent>(raw).unwrap() {
            WsEvent::NoteSelected { note, placeholder, greeting } => {
                assert!(note.is_none());
                assert_eq!(placeholder, "Ask about your notes...");
                assert_eq!(greeting.heading, "Start Learning");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn accents_per_difficulty() {
        assert_eq!(difficulty_accent("Beginner"), "emerald");
        assert_eq!(difficulty_accent("Advanced"), "rose");
    }
}
