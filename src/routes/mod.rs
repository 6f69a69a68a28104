pub mod api_routes;
pub mod catalog_routes;
pub mod ws_routes;

use axum::routing::{get, post};
use axum::Router;

use crate::service::session_service::SessionService;
use api_routes::{
    clear_handler, close_session_handler, create_session_handler, get_session_handler,
    list_sessions_handler, select_note_handler, select_prompt_handler, set_input_handler,
    start_tutoring_handler, submit_handler,
};
use catalog_routes::{
    get_subject_handler, list_note_subjects_handler, list_notes_handler, list_subjects_handler,
};
use ws_routes::session_events_handler;

pub fn router(svc: SessionService) -> Router {
    Router::new()
        // Catalog
        .route("/api/subjects", get(list_subjects_handler))
        .route("/api/subjects/{id}", get(get_subject_handler))
        .route("/api/notes", get(list_notes_handler))
        .route("/api/notes/subjects", get(list_note_subjects_handler))
        // Sessions
        .route("/api/sessions", post(create_session_handler).get(list_sessions_handler))
        .route("/api/sessions/{id}", get(get_session_handler).delete(close_session_handler))
        // sendBeacon can only POST
        .route("/api/sessions/{id}/close", post(close_session_handler))
        .route("/api/sessions/{id}/input", axum::routing::put(set_input_handler))
        .route("/api/sessions/{id}/prompt", post(select_prompt_handler))
        .route("/api/sessions/{id}/note", axum::routing::put(select_note_handler))
        .route("/api/sessions/{id}/start", post(start_tutoring_handler))
        .route("/api/sessions/{id}/messages", post(submit_handler).delete(clear_handler))
        // Events
        .route("/ws/sessions/{id}", get(session_events_handler))
        .with_state(svc)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::agent::SimulatedTutor;
    use crate::catalog::note_catalog::NoteCatalog;
    use crate::catalog::subject_catalog::SubjectCatalog;
    use crate::config::AppConfig;

    fn server() -> TestServer {
        let config = AppConfig::default();
        let svc = SessionService::new(
            &config,
            SubjectCatalog::new(),
            NoteCatalog::new(),
            SimulatedTutor::new(config.reply_delay),
        );
        TestServer::new(router(svc)).unwrap()
    }

    async fn create(server: &TestServer, subject: &str) -> String {
        let response = server.post("/api/sessions").json(&json!({ "subject": subject })).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn subjects_are_listed_in_order() {
        let server = server();
        let subjects: Value = server.get("/api/subjects").await.json();
        let ids: Vec<_> = subjects
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["ai", "python", "chemistry", "mechanical"]);

        server.get("/api/subjects/biology").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn notes_can_be_filtered() {
        let server = server();
        let notes: Value = server.get("/api/notes").add_query_param("subject", "AI").await.json();
        assert_eq!(notes.as_array().unwrap().len(), 2);
        assert_eq!(notes[0]["difficulty"], "Beginner");

        let labels: Vec<String> = server.get("/api/notes/subjects").await.json();
        assert_eq!(labels, ["AI", "Programming", "Chemistry", "Mechanical"]);
    }

    #[tokio::test]
    async fn unknown_subject_cannot_open_a_session() {
        let server = server();
        let response = server.post("/api/sessions").json(&json!({ "subject": "biology" })).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], "Subject 'biology' not found");
    }

    #[tokio::test]
    async fn submit_then_clear() {
        let server = server();
        let id = create(&server, "ai").await;

        let submitted: Value = server
            .post(&format!("/api/sessions/{id}/messages"))
            .json(&json!({ "text": "What is a derivative?" }))
            .await
            .json();
        assert_eq!(submitted["accepted"], true);
        assert_eq!(submitted["message"]["role"], "user");
        assert_eq!(submitted["snapshot"]["composing"], true);
        assert_eq!(submitted["snapshot"]["phase"], "awaiting_reply");

        let cleared: Value = server.delete(&format!("/api/sessions/{id}/messages")).await.json();
        assert_eq!(cleared["messages"].as_array().unwrap().len(), 0);
        assert_eq!(cleared["composing"], false);
    }

    #[tokio::test]
    async fn blank_submission_is_accepted_false() {
        let server = server();
        let id = create(&server, "python").await;
        let response: Value = server
            .post(&format!("/api/sessions/{id}/messages"))
            .json(&json!({ "text": "   " }))
            .await
            .json();
        assert_eq!(response["accepted"], false);
        assert!(response["message"].is_null());
    }

    #[tokio::test]
    async fn prompt_fills_input_and_bare_submit_sends_it() {
        let server = server();
        let id = create(&server, "ai").await;

        let snapshot: Value = server
            .post(&format!("/api/sessions/{id}/prompt"))
            .json(&json!({ "text": "Explain neural networks" }))
            .await
            .json();
        assert_eq!(snapshot["input"], "Explain neural networks");
        assert_eq!(snapshot["messages"].as_array().unwrap().len(), 0);
        assert_eq!(snapshot["can_send"], true);

        let response: Value = server.post(&format!("/api/sessions/{id}/messages")).await.json();
        assert_eq!(response["accepted"], true);
        assert_eq!(response["message"]["content"], "Explain neural networks");
    }

    #[tokio::test]
    async fn note_selection_and_start() {
        let server = server();
        let id = create(&server, "chemistry").await;

        let none: Value = server.post(&format!("/api/sessions/{id}/start")).await.json();
        assert!(none["notice"].is_null());

        let snapshot: Value = server
            .put(&format!("/api/sessions/{id}/note"))
            .json(&json!({ "note_id": "4" }))
            .await
            .json();
        assert_eq!(snapshot["placeholder"], "Ask about Organic Chemistry Fundamentals...");
        assert_eq!(snapshot["greeting"]["heading"], "Ready to Learn!");

        let started: Value = server.post(&format!("/api/sessions/{id}/start")).await.json();
        assert_eq!(started["notice"]["title"], "🧪 Chemistry Tutoring Started!");

        server
            .put(&format!("/api/sessions/{id}/note"))
            .json(&json!({ "note_id": "nope" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn overlong_input_is_bad_request() {
        let server = server();
        let id = create(&server, "ai").await;
        server
            .put(&format!("/api/sessions/{id}/input"))
            .json(&json!({ "text": "x".repeat(8001) }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn closed_session_is_gone() {
        let server = server();
        let id = create(&server, "ai").await;
        let listed: Value = server.get("/api/sessions").await.json();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        server
            .delete(&format!("/api/sessions/{id}"))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/sessions/{id}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format!("/api/sessions/{id}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unload_beacon_closes_the_session() {
        let server = server();
        let id = create(&server, "python").await;

        server
            .post(&format!("/api/sessions/{id}/close"))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let listed: Value = server.get("/api/sessions").await.json();
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reply_shows_up_in_snapshot() {
        let server = server();
        let id = create(&server, "ai").await;
        server
            .post(&format!("/api/sessions/{id}/messages"))
            .json(&json!({ "text": "What is a derivative?" }))
            .await;

        tokio::time::sleep(Duration::from_millis(1600)).await;

        let snapshot: Value = server.get(&format!("/api/sessions/{id}")).await.json();
        let messages = snapshot["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(snapshot["composing"], false);
    }
}
