use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    CreateSessionRequest, Note, SelectNoteRequest, SessionSnapshot, StartResponse, Subject,
    SubmitResponse, TextRequest,
};

/// Base URL of the backend API server.
const API_BASE: &str = "http://localhost:8080";

async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, String> {
    if !resp.ok() {
        return Err(format!("Server error: {}", resp.status()));
    }
    resp.json::<T>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

async fn get<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let resp = Request::get(&format!("{API_BASE}{path}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read(resp).await
}

async fn send_json<B: Serialize, T: DeserializeOwned>(
    method: &str,
    path: &str,
    body: &B,
) -> Result<T, String> {
    let url = format!("{API_BASE}{path}");
    let builder = match method {
        "PUT" => Request::put(&url),
        _ => Request::post(&url),
    };
    let resp = builder
        .json(body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read(resp).await
}

pub async fn fetch_subjects() -> Result<Vec<Subject>, String> {
    get("/api/subjects").await
}

pub async fn fetch_notes() -> Result<Vec<Note>, String> {
    get("/api/notes").await
}

pub async fn fetch_note_subjects() -> Result<Vec<String>, String> {
    get("/api/notes/subjects").await
}

pub async fn create_session(subject: &str) -> Result<SessionSnapshot, String> {
    let body = CreateSessionRequest { subject: subject.to_string() };
    send_json("POST", "/api/sessions", &body).await
}

/// Tears a session down; failures only matter for logging.
pub async fn close_session(id: &str) -> Result<(), String> {
    let resp = Request::delete(&format!("{API_BASE}/api/sessions/{id}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    if !resp.ok() {
        return Err(format!("Server error: {}", resp.status()));
    }
    Ok(())
}

pub async fn fetch_session(id: &str) -> Result<SessionSnapshot, String> {
    get(&format!("/api/sessions/{id}")).await
}

/// Closes a session while the page is unloading, when `fetch` may be cut off.
pub fn close_on_unload(id: &str) -> bool {
    let url = format!("{API_BASE}/api/sessions/{id}/close");
    web_sys::window()
        .and_then(|w| w.navigator().send_beacon(&url).ok())
        .unwrap_or(false)
}

pub async fn select_prompt(id: &str, text: &str) -> Result<SessionSnapshot, String> {
    let body = TextRequest { text: text.to_string() };
    send_json("POST", &format!("/api/sessions/{id}/prompt"), &body).await
}

pub async fn select_note(id: &str, note_id: Option<String>) -> Result<SessionSnapshot, String> {
    let body = SelectNoteRequest { note_id };
    send_json("PUT", &format!("/api/sessions/{id}/note"), &body).await
}

pub async fn start_tutoring(id: &str) -> Result<StartResponse, String> {
    let resp = Request::post(&format!("{API_BASE}/api/sessions/{id}/start"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read(resp).await
}

pub async fn submit(id: &str, text: &str) -> Result<SubmitResponse, String> {
    let body = TextRequest { text: text.to_string() };
    send_json("POST", &format!("/api/sessions/{id}/messages"), &body).await
}

pub async fn clear(id: &str) -> Result<SessionSnapshot, String> {
    let resp = Request::delete(&format!("{API_BASE}/api/sessions/{id}/messages"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read(resp).await
}

/// Returns the WebSocket URL for a session's event feed.
pub fn ws_url(session_id: &str) -> String {
    format!("ws://localhost:8080/ws/sessions/{session_id}")
}
