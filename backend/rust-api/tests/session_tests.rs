use adaptive_quiz_api::repositories::InMemoryRepository;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

fn seeded_app() -> Router {
    let repo = InMemoryRepository::new().with_questions(common::full_bank());
    common::create_test_app(Arc::new(repo))
}

async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_new_user_daily_session_is_full_and_annotated() {
    let app = seeded_app();
    let body = json!({ "user_id": "new-learner", "category_id": "math", "mode": "daily" });

    let (status, json) = post_json(&app, "/api/v1/sessions", body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", json);

    assert_eq!(json["mode"], "daily");
    assert_eq!(json["requested_count"], 7);
    assert_eq!(json["estimated_seconds"], 210);
    assert_eq!(json["user_context"]["is_new"], true);
    assert_eq!(json["user_context"]["skill_level"], 1);

    let questions = json["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 7);

    let ids: HashSet<&str> = questions
        .iter()
        .map(|q| q["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 7, "questions must not repeat");

    assert_eq!(questions[0]["metadata"]["position_role"], "warm_up");
    assert_eq!(questions[1]["metadata"]["position_role"], "warm_up");
    assert!(questions[0]["metadata"]["encouragement"].is_string());
    for q in questions {
        assert_eq!(q["category_id"], "math");
        assert!(q["metadata"]["difficulty_label"].is_string());
    }
}

#[tokio::test]
async fn test_unknown_mode_falls_back_to_daily() {
    let app = seeded_app();
    let body = json!({ "user_id": "u1", "category_id": "math", "mode": "marathon" });

    let (status, json) = post_json(&app, "/api/v1/sessions", body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["mode"], "daily");
    assert_eq!(json["config"]["question_count"], 7);
    assert_eq!(json["config"]["seconds_per_question"], 45);
}

#[tokio::test]
async fn test_practice_mode_uses_its_own_config() {
    let app = seeded_app();
    let body = json!({ "user_id": "u2", "category_id": "math", "mode": "practice" });

    let (status, json) = post_json(&app, "/api/v1/sessions", body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["mode"], "practice");
    assert_eq!(json["config"]["lives"], "unlimited");
    assert!(json["config"]["seconds_per_question"].is_null());
    assert_eq!(json["questions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_small_bank_yields_short_session() {
    let repo = InMemoryRepository::new().with_questions(vec![
        common::question("only-1", 1.0, &[]),
        common::question("only-2", 4.5, &[]),
    ]);
    let app = common::create_test_app(Arc::new(repo));
    let body = json!({ "user_id": "u3", "category_id": "math", "mode": "challenge" });

    let (status, json) = post_json(&app, "/api/v1/sessions", body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["requested_count"], 10);
    let len = json["questions"].as_array().unwrap().len();
    assert!((1..=2).contains(&len), "got {} questions", len);
}

#[tokio::test]
async fn test_empty_category_returns_404() {
    let app = seeded_app();
    let body = json!({ "user_id": "u4", "category_id": "history" });

    let (status, json) = post_json(&app, "/api/v1/sessions", body.to_string()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("no content available for category history"));
}

#[tokio::test]
async fn test_empty_user_id_is_rejected() {
    let app = seeded_app();
    let body = json!({ "user_id": "", "category_id": "math" });

    let (status, json) = post_json(&app, "/api/v1/sessions", body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("user_id"));
}

#[tokio::test]
async fn test_malformed_body_returns_json_error() {
    let app = seeded_app();

    let (status, json) = post_json(&app, "/api/v1/sessions", "{not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let app = seeded_app();
    let body = json!({ "user_id": "u5", "category_id": "math" });
    let (status, _) = post_json(&app, "/api/v1/sessions", body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["modes"].as_array().unwrap().len(), 4);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("sessions_assembled_total"));
    assert!(text.contains("context_cache_lookups_total"));
}

#[tokio::test]
async fn test_trace_id_is_echoed() {
    let app = seeded_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
}
