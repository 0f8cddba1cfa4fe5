use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use poll_backend::{db, routes, AppState, Config, PollRepo};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("polls.db").display());
    let pool = db::create_pool(&url, 5).await.unwrap();
    let app = routes::build_router(AppState::new(PollRepo::new(pool)), &Config::default());
    (app, dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, question: &str, options: &[&str]) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/polls",
        Some(json!({ "question": question, "options": options })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let (app, _dir) = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn poll_lifecycle() {
    let (app, _dir) = test_app().await;

    let id = create(&app, "Best color?", &["Red", "Blue"]).await;
    assert_eq!(id, 1);

    let (status, poll) = send(&app, "GET", "/api/polls/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(poll["question"], "Best color?");
    assert!(poll["created_at"].is_string());
    assert_eq!(
        poll["options"],
        json!([
            { "id": 1, "text": "Red", "votes": 0 },
            { "id": 2, "text": "Blue", "votes": 0 },
        ])
    );

    let (status, poll) = send(&app, "POST", "/api/polls/1/vote", Some(json!({ "optionId": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(poll["options"][0]["votes"], 1);
    assert_eq!(poll["options"][1]["votes"], 0);

    let (status, results) = send(&app, "GET", "/api/polls/1/results", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["total_votes"], 1);
    assert_eq!(results["options"][0]["percent"], 100);
    assert_eq!(results["options"][1]["percent"], 0);

    let (status, body) = send(&app, "DELETE", "/api/polls/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = send(&app, "GET", "/api/polls/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn create_trims_and_filters_options() {
    let (app, _dir) = test_app().await;

    let id = create(&app, "  Lunch?  ", &[" Pizza ", "", "   ", "Sushi"]).await;
    let (_, poll) = send(&app, "GET", &format!("/api/polls/{id}"), None).await;
    assert_eq!(poll["question"], "Lunch?");
    assert_eq!(poll["options"].as_array().unwrap().len(), 2);
    assert_eq!(poll["options"][0]["text"], "Pizza");
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let (app, _dir) = test_app().await;

    let cases = [
        json!({ "question": "Only one?", "options": ["Yes"] }),
        json!({ "question": "Blank options?", "options": ["Yes", "   "] }),
        json!({ "options": ["a", "b"] }),
        json!({ "question": "", "options": ["a", "b"] }),
        json!({ "question": "No options" }),
    ];
    for case in cases {
        let (status, body) = send(&app, "POST", "/api/polls", Some(case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    let (_, polls) = send(&app, "GET", "/api/polls", None).await;
    assert_eq!(polls, json!([]));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (app, _dir) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/polls")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let (app, _dir) = test_app().await;
    let first = create(&app, "First", &["a", "b"]).await;
    let second = create(&app, "Second", &["c", "d"]).await;

    let (status, polls) = send(&app, "GET", "/api/polls", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = polls
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(polls[0]["options"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn vote_errors() {
    let (app, _dir) = test_app().await;
    let first = create(&app, "First", &["a", "b"]).await;
    let second = create(&app, "Second", &["c", "d"]).await;

    let (status, body) = send(&app, "POST", &format!("/api/polls/{first}/vote"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // option 3 belongs to the second poll
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/polls/{first}/vote"),
        Some(json!({ "optionId": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_vote");

    let (status, _) = send(&app, "POST", "/api/polls/999/vote", Some(json!({ "optionId": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for id in [first, second] {
        let (_, poll) = send(&app, "GET", &format!("/api/polls/{id}"), None).await;
        assert!(poll["options"].as_array().unwrap().iter().all(|o| o["votes"] == 0));
    }
}

#[tokio::test]
async fn unknown_or_malformed_ids() {
    let (app, _dir) = test_app().await;

    let (status, _) = send(&app, "GET", "/api/polls/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/polls/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/api/polls/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}
