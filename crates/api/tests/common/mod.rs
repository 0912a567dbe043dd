#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use questline_core::clock::FixedClock;
use questline_core::config::ProgressionConfig;
use questline_core::roles::{ROLE_MENTEE, ROLE_MENTOR};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use questline_api::auth::jwt::{generate_access_token, JwtConfig};
use questline_api::config::ServerConfig;
use questline_api::engine::ProgressionEngine;
use questline_api::router::build_app_router;
use questline_api::state::AppState;

const TEST_JWT_SECRET: &str = "questline-test-secret";

/// Monday. Not a weekend day under the default calendar.
pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 17).unwrap()
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        progression: ProgressionConfig::default(),
    }
}

/// Application state with the clock pinned to noon on `day`.
pub fn test_state_on(pool: PgPool, day: NaiveDate) -> AppState {
    AppState::new(pool, test_config(), Arc::new(FixedClock::on(day)))
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_on(pool, test_day())
}

pub fn build_test_app_on(pool: PgPool, day: NaiveDate) -> Router {
    let state = test_state_on(pool, day);
    build_app_router(state, &test_config())
}

/// A standalone engine for tests that bypass HTTP.
pub fn test_engine(pool: PgPool) -> Arc<ProgressionEngine> {
    test_state_on(pool, test_day()).engine
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn mentor_token() -> String {
    generate_access_token(1, ROLE_MENTOR, &test_config().jwt).unwrap()
}

pub fn mentee_token() -> String {
    generate_access_token(2, ROLE_MENTEE, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a quest through the API and return its id.
pub async fn create_quest(app: Router, title: &str, xp_reward: i64) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/quests",
        &mentor_token(),
        serde_json::json!({ "title": title, "xp_reward": xp_reward }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Start and submit a quest, returning the progress id.
pub async fn start_and_submit(app: Router, quest_id: i64) -> i64 {
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/quests/{quest_id}/start"),
        &mentee_token(),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let progress_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        &format!("/api/v1/progress/{progress_id}/submit"),
        &mentee_token(),
        serde_json::json!({ "evidence_links": ["https://example.com/pr/1"] }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    progress_id
}
