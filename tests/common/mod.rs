use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tareas::state::AppState;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-key";

pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    tareas::db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn setup_app() -> Router {
    let pool = setup_test_db().await;
    tareas::api::router(AppState::new(pool, TEST_API_KEY))
}

/// Sends a request and returns the status with the body parsed as JSON
/// (`Null` for an empty body).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    api_key: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

pub async fn create(app: &Router, title: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/tareas",
        Some(TEST_API_KEY),
        Some(serde_json::json!({ "title": title, "description": "descripción" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}
