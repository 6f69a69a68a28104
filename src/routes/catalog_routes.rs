use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::AppError;
use crate::models::NoteQuery;
use crate::routes::api_routes::error_response;
use crate::service::session_service::SessionService;

/// GET `/api/subjects` — subject listing
pub async fn list_subjects_handler(State(svc): State<SessionService>) -> impl IntoResponse {
    Json(svc.subjects().find_all())
}

/// GET `/api/subjects/{id}`
pub async fn get_subject_handler(
    Path(id): Path<String>,
    State(svc): State<SessionService>,
) -> Response {
    match svc.subjects().find_by_id(&id) {
        Some(subject) => Json(subject).into_response(),
        None => error_response(&AppError::SubjectNotFound { id }),
    }
}

/// GET `/api/notes?subject=` — preloaded notes, optionally for one subject
pub async fn list_notes_handler(
    State(svc): State<SessionService>,
    Query(query): Query<NoteQuery>,
) -> impl IntoResponse {
    Json(svc.notes().filter_by_subject(query.subject.as_deref()))
}

/// GET `/api/notes/subjects` — filter labels for the notes panel
pub async fn list_note_subjects_handler(State(svc): State<SessionService>) -> impl IntoResponse {
    Json(svc.notes().subjects())
}
