//! Integration tests for the seoforge API.
//!
//! Drives every route through the full router with an in-memory database
//! and a scripted AI backend. Each test builds its own state.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use seoforge_api::create_router;
use seoforge_api::handlers::HealthResponse;
use seoforge_api::state::AppState;
use seoforge_core::config::SeoforgeConfig;
use seoforge_core::error::SeoforgeError;
use seoforge_generate::{GenerateError, ScriptedBackend};
use seoforge_storage::Database;

// =============================================================================
// Helpers
// =============================================================================

fn make_state_with(backend: ScriptedBackend) -> AppState {
    let db = Database::in_memory().unwrap();
    AppState::new(SeoforgeConfig::default(), db, Arc::new(backend))
}

fn make_state() -> AppState {
    make_state_with(ScriptedBackend::valid())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send one request against a router built from (a clone of) `state`.
async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = create_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

fn save_body(title: &str) -> String {
    serde_json::json!({
        "transcript": "the transcript",
        "finalDescription": "final description",
        "finalThumbnailTitle": "THUMB",
        "finalVideoTitle": title,
        "finalTags": "a, b, c"
    })
    .to_string()
}

fn drop_table(state: &AppState, table: &str) {
    let sql = format!("PRAGMA foreign_keys = OFF; DROP TABLE {};", table);
    state
        .database
        .with_conn(|conn| {
            conn.execute_batch(&sql)
                .map_err(|e| SeoforgeError::Storage(e.to_string()))
        })
        .unwrap();
}

/// Open a file database whose schema_migrations table has the wrong columns,
/// so the startup bootstrap fails and the app starts without tables.
fn make_state_without_schema(dir: &tempfile::TempDir) -> AppState {
    let path = dir.path().join("seoforge.db");
    let db = Database::new(&path).unwrap();
    db.with_conn(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             DROP TABLE saved_results;
             DROP TABLE training_examples;
             DROP TABLE generations;
             DROP TABLE schema_migrations;
             CREATE TABLE schema_migrations (version INTEGER);",
        )
        .map_err(|e| SeoforgeError::Storage(e.to_string()))
    })
    .unwrap();
    drop(db);

    let db = Database::new(&path).unwrap();
    AppState::new(SeoforgeConfig::default(), db, Arc::new(ScriptedBackend::valid()))
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let state = make_state();
    let resp = create_router(state).oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert!(health.schema_ready);
}

#[tokio::test]
async fn test_missing_schema_reported_then_created_on_generate() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state_without_schema(&dir);

    let (status, health) = send(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["schema_ready"], false);

    let (status, body) = send(
        &state,
        post_json("/content/generate", r#"{"transcript":"hello"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db_saved"], false);
    assert!(body["id"].is_null());
    assert_eq!(body["video_title_options"].as_array().unwrap().len(), 5);

    // Clear the conflicting table; the next generate builds the schema.
    state
        .database
        .with_conn(|conn| {
            conn.execute_batch("DROP TABLE schema_migrations;")
                .map_err(|e| SeoforgeError::Storage(e.to_string()))
        })
        .unwrap();

    let (status, body) = send(
        &state,
        post_json("/content/generate", r#"{"transcript":"hello"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db_saved"], true);
    assert!(body["id"].is_i64());

    let (_, health) = send(&state, get("/health")).await;
    assert_eq!(health["schema_ready"], true);
}

#[tokio::test]
async fn test_ai_health_ok() {
    let state = make_state();
    let (status, body) = send(&state, get("/ai/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], 200);
    assert!(body["endpoint"].is_string());
}

#[tokio::test]
async fn test_ai_health_upstream_failure() {
    let state = make_state_with(ScriptedBackend::failing_status(503));
    let (status, body) = send(&state, get("/ai/health")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["ok"], false);
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_ai_health_unreachable() {
    let state = make_state_with(ScriptedBackend::with_reply(Err(
        GenerateError::UpstreamUnavailable("connection refused".to_string()),
    )));
    let (status, body) = send(&state, get("/ai/health")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

// =============================================================================
// POST /content/generate
// =============================================================================

#[tokio::test]
async fn test_generate_success() {
    let state = make_state();
    let (status, body) = send(
        &state,
        post_json("/content/generate", r#"{"transcript":"today we build a shed"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].is_i64());
    assert_eq!(body["db_saved"], true);
    assert_eq!(body["video_title_options"].as_array().unwrap().len(), 5);
    assert!(body["description"].is_string());
    assert!(body["thumbnail_title"].is_string());
    assert!(body["tags"].is_string());
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn test_generate_missing_transcript() {
    let backend = Arc::new(ScriptedBackend::valid());
    let state = AppState::new(
        SeoforgeConfig::default(),
        Database::in_memory().unwrap(),
        backend.clone(),
    );

    for body in [r#"{}"#, r#"{"transcript":""}"#, r#"{"transcript":"   "}"#] {
        let (status, json) = send(&state, post_json("/content/generate", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(json["message"], "Transcript is required");
    }
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_generate_upstream_error() {
    let state = make_state_with(ScriptedBackend::failing_status(500));
    let (status, body) = send(
        &state,
        post_json("/content/generate", r#"{"transcript":"hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "bad_gateway");
    assert_eq!(body["details"]["status"], 500);

    let count: i64 = state
        .database
        .with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM generations", [], |row| row.get(0))
                .map_err(|e| SeoforgeError::Storage(e.to_string()))
        })
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_generate_malformed_content() {
    let state = make_state_with(ScriptedBackend::with_content("definitely not json"));
    let (status, body) = send(
        &state,
        post_json("/content/generate", r#"{"transcript":"hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Unexpected AI response format");
}

#[tokio::test]
async fn test_generate_db_failure_returns_content() {
    let state = make_state();
    drop_table(&state, "generations");

    let (status, body) = send(
        &state,
        post_json("/content/generate", r#"{"transcript":"hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db_saved"], false);
    assert!(body["id"].is_null());
    assert!(body["created_at"].is_null());
    assert_eq!(body["video_title_options"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_generate_oversized_body() {
    let state = make_state();
    let transcript = "a".repeat(1100 * 1024);
    let body = serde_json::json!({ "transcript": transcript }).to_string();

    let (status, json) = send(&state, post_json("/content/generate", &body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "payload_too_large");
}

// =============================================================================
// POST /results and GET /history
// =============================================================================

#[tokio::test]
async fn test_save_and_history_round_trip() {
    let state = make_state();

    let (status, saved) = send(&state, post_json("/results", &save_body("Chosen Title"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(saved["id"].is_i64());
    assert!(saved["generation_id"].is_null());
    assert_eq!(saved["final_video_title"], "Chosen Title");
    assert_eq!(saved["final_tags"], "a, b, c");
    assert!(saved["created_at"].is_string());

    let (status, history) = send(&state, get("/history")).await;
    assert_eq!(status, StatusCode::OK);
    let rows = history.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], saved);
}

#[tokio::test]
async fn test_save_links_generation() {
    let state = make_state();
    let (_, generated) = send(
        &state,
        post_json("/content/generate", r#"{"transcript":"hello"}"#),
    )
    .await;
    let generation_id = generated["id"].as_i64().unwrap();

    let mut body: Value = serde_json::from_str(&save_body("Picked")).unwrap();
    body["generationId"] = generation_id.into();
    let (status, saved) = send(&state, post_json("/results", &body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["generation_id"], generation_id);
}

#[tokio::test]
async fn test_save_missing_field() {
    let state = make_state();
    let mut body: Value = serde_json::from_str(&save_body("x")).unwrap();
    body.as_object_mut().unwrap().remove("finalTags");

    let (status, json) = send(&state, post_json("/results", &body.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("finalTags"));

    let (_, history) = send(&state, get("/history")).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_history_newest_first_with_paging() {
    let state = make_state();
    for title in ["first", "second", "third"] {
        let (status, _) = send(&state, post_json("/results", &save_body(title))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, all) = send(&state, get("/history")).await;
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["final_video_title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    let (_, page) = send(&state, get("/history?limit=1&offset=1")).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["final_video_title"], "second");

    let (_, none) = send(&state, get("/history?limit=0")).await;
    assert!(none.as_array().unwrap().is_empty());

    let (status, fallback) = send(&state, get("/history?limit=abc&offset=xyz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fallback.as_array().unwrap().len(), 3);

    let (_, leading) = send(&state, get("/history?limit=2abc")).await;
    assert_eq!(leading.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_history_rejects_repeated_params() {
    let state = make_state();
    let resp = create_router(state)
        .oneshot(get("/history?limit=1&limit=2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let json = body_json(resp).await;
    assert_eq!(json["error"], "bad_request");
    assert!(json["message"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn test_history_storage_failure() {
    let state = make_state();
    drop_table(&state, "saved_results");

    let (status, body) = send(&state, get("/history")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
}

// =============================================================================
// /training
// =============================================================================

#[tokio::test]
async fn test_training_crud() {
    let state = make_state();

    let (status, created) = send(
        &state,
        post_json(
            "/training",
            r#"{"exampleType":"complete","title":"Great Title","description":"","notes":"keep it short"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["example_type"], "complete");
    assert_eq!(created["title"], "Great Title");
    assert!(created["description"].is_null());
    assert!(created["tags"].is_null());
    assert_eq!(created["notes"], "keep it short");
    let id = created["id"].as_i64().unwrap();

    let (status, listed) = send(&state, get("/training")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap(), &vec![created]);

    let (status, deleted) = send(&state, delete(&format!("/training?id={}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    let (_, listed) = send(&state, get("/training")).await;
    assert!(listed.as_array().unwrap().is_empty());

    // Deleting again is still a success.
    let (status, deleted) = send(&state, delete(&format!("/training?id={}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);
}

#[tokio::test]
async fn test_training_invalid_type() {
    let state = make_state();
    for body in [r#"{}"#, r#"{"exampleType":"thumbnail"}"#] {
        let (status, json) = send(&state, post_json("/training", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Valid example type is required");
    }

    let (_, listed) = send(&state, get("/training")).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_training_delete_bad_ids() {
    let state = make_state();
    for uri in ["/training", "/training?id=", "/training?id=abc", "/training?id=1&id=2"] {
        let (status, json) = send(&state, delete(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(json["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_training_feeds_generation_prompt() {
    let backend = Arc::new(ScriptedBackend::valid());
    let state = AppState::new(
        SeoforgeConfig::default(),
        Database::in_memory().unwrap(),
        backend.clone(),
    );

    send(
        &state,
        post_json("/training", r#"{"exampleType":"title","title":"My Signature Title"}"#),
    )
    .await;
    let (status, _) = send(
        &state,
        post_json("/content/generate", r#"{"transcript":"hello"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = &backend.requests()[0];
    assert!(request.messages[0].content.contains("Title: My Signature Title"));
}
