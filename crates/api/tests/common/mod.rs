use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use kintree_api::auth::jwt::{generate_access_token, JwtConfig};
use kintree_api::config::ServerConfig;
use kintree_api::routes;
use kintree_api::state::AppState;
use kintree_api::storage::LocalStore;

/// Shared secret for all test tokens.
const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_base_url: "http://localhost:5173".to_string(),
        upload_dir: "unused".to_string(),
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Mint a bearer token for the given user id, signed with the test secret.
pub fn token_for(user_id: i64) -> String {
    let config = test_config();
    generate_access_token(user_id, &config.jwt).expect("token generation should succeed")
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a per-test upload directory.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let upload_dir =
        std::env::temp_dir().join(format!("kintree-test-{}", uuid::Uuid::new_v4()));
    build_test_app_with_upload_dir(pool, upload_dir)
}

/// Like [`build_test_app`], but storing uploads under the given directory
/// so tests can inspect what is actually on disk.
pub fn build_test_app_with_upload_dir(pool: PgPool, upload_dir: std::path::PathBuf) -> Router {
    let config = test_config();
    let store = Arc::new(LocalStore::new(upload_dir));

    let state = AppState {
        pool,
        config: Arc::new(config),
        store,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Send a request and return the response.
pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should not fail")
}

/// GET without authentication.
pub async fn get(app: Router, path: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Build an authenticated JSON request.
pub fn json_request(
    method: Method,
    path: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header("authorization", format!("Bearer {token}"));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Authenticated GET.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response {
    send(app, json_request(Method::GET, path, token, None)).await
}

/// Authenticated POST with a JSON body.
pub async fn post_json(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, json_request(Method::POST, path, token, Some(body))).await
}

/// Authenticated PATCH with a JSON body.
pub async fn patch_json(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, json_request(Method::PATCH, path, token, Some(body))).await
}

/// Authenticated DELETE, with an optional JSON body.
pub async fn delete_auth(
    app: Router,
    path: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Response {
    send(app, json_request(Method::DELETE, path, token, body)).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Create a tree via the API and return its id.
pub async fn create_tree(app: &Router, token: &str, name: &str) -> i64 {
    let response = post_json(
        app.clone(),
        "/api/v1/trees",
        token,
        serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a member via the API and return its id.
pub async fn create_member(
    app: &Router,
    token: &str,
    tree_id: i64,
    first_name: &str,
    gender: &str,
) -> i64 {
    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/members"),
        token,
        serde_json::json!({ "first_name": first_name, "gender": gender }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
