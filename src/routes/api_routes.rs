use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::errors::AppError;
use crate::models::{
    CreateSessionRequest, SelectNoteRequest, StartResponse, SubmitRequest, TextRequest,
};
use crate::service::session_service::SessionService;

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST `/api/sessions` — open a tutoring session for a subject
pub async fn create_session_handler(
    State(svc): State<SessionService>,
    Json(body): Json<CreateSessionRequest>,
) -> Response {
    match svc.create(&body.subject) {
        Ok(snapshot) => (StatusCode::CREATED, Json(snapshot)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/api/sessions` — live sessions
pub async fn list_sessions_handler(State(svc): State<SessionService>) -> impl IntoResponse {
    Json(svc.list())
}

/// GET `/api/sessions/{id}`
pub async fn get_session_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
) -> Response {
    respond(svc.snapshot(&id))
}

/// DELETE `/api/sessions/{id}` (or POST `/api/sessions/{id}/close` from an unload beacon)
pub async fn close_session_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
) -> Response {
    match svc.close(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/api/sessions/{id}/input` — replace the input buffer
pub async fn set_input_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
    Json(body): Json<TextRequest>,
) -> Response {
    respond(svc.set_input(&id, body.text))
}

/// POST `/api/sessions/{id}/prompt` — fill the input with a suggested prompt
pub async fn select_prompt_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
    Json(body): Json<TextRequest>,
) -> Response {
    respond(svc.select_prompt(&id, body.text))
}

/// PUT `/api/sessions/{id}/note` — select or deselect a study note
pub async fn select_note_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
    Json(body): Json<SelectNoteRequest>,
) -> Response {
    respond(svc.select_note(&id, body.note_id.as_deref()))
}

/// POST `/api/sessions/{id}/start`
pub async fn start_tutoring_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
) -> Response {
    respond(svc.start_tutoring(&id).map(|notice| StartResponse { notice }))
}

/// POST `/api/sessions/{id}/messages` — submit a question
pub async fn submit_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
    body: Bytes,
) -> Response {
    // An empty body sends the input buffer.
    let request: SubmitRequest = if body.is_empty() {
        SubmitRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Invalid request: {e}") })),
                )
                    .into_response()
            }
        }
    };
    respond(svc.submit(&id, request.text))
}

/// DELETE `/api/sessions/{id}/messages` — clear the transcript
pub async fn clear_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
) -> Response {
    respond(svc.clear(&id))
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn respond<T: serde::Serialize>(result: Result<T, AppError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => error_response(&e),
    }
}

pub(crate) fn error_response(err: &AppError) -> Response {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        error!("Request failed: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
