#![allow(dead_code)]

//! Shared helpers for the HTTP integration tests.
//!
//! Builds the production router (full middleware stack) on a test pool and
//! provides request/response plumbing via `tower::ServiceExt` -- no TCP
//! listener involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use teamup_api::auth::jwt::{generate_access_token, JwtConfig};
use teamup_api::auth::password::hash_password;
use teamup_api::config::ServerConfig;
use teamup_api::router::build_router;
use teamup_api::state::AppState;
use teamup_cloud::MemoryImageStore;
use teamup_db::models::user::CreateUser;
use teamup_db::repositories::UserRepo;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_involved_projects: 3,
        storage_backend: "memory".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// The search queue's receiver is dropped, so snapshot publishes are
/// silently discarded -- exactly the fire-and-forget contract.
pub fn build_test_app(pool: PgPool) -> Router {
    let (search, _rx) = teamup_search::sink::channel(16);

    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        search,
        images: Arc::new(MemoryImageStore::new()),
    };

    build_router(state)
}

/// Create a user directly through the repository and mint a token for it.
pub async fn create_user(pool: &PgPool, username: &str) -> (i64, String) {
    let password_hash = hash_password("test-password-123").unwrap();
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash,
        },
    )
    .await
    .unwrap();

    let token = generate_access_token(user.id, &test_config().jwt).unwrap();
    (user.id, token)
}

/// Send a request with an optional Bearer token and optional JSON body.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response {
    request(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    request(app, Method::POST, uri, token, Some(body)).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    request(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    request(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    request(app, Method::DELETE, uri, token, body).await
}

/// Send a multipart PUT with a single file field.
pub async fn put_multipart(
    app: Router,
    uri: &str,
    token: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response {
    let boundary = "teamup-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    app.oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

/// A valid create-project payload: DEV x2 with the creator taking one seat.
pub fn project_payload(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "description_html": "<p>We build things</p>",
        "languages": ["ko", "en"],
        "tags": ["web", "backend"],
        "positions": [{ "name": "DEV", "count": 2 }],
        "my_position": "DEV",
    })
}

/// Create a project through the API, returning its id.
pub async fn create_project(pool: &PgPool, token: &str, title: &str) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/projects", Some(token), project_payload(title)).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
