use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use axum_helpers::JwtConfig;
use core_config::{Environment, app_info, server::ServerConfig};
use domain_users::InMemoryUserRepository;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use users_api::{
    AppState, Config, Storage, api::auth::LOGIN_SUBJECT, build_router, config::StorageBackend,
};

const SECRET: &str = "integration-test-secret-at-least-32-chars";

fn app() -> Router {
    let config = Config {
        app: app_info!(),
        server: ServerConfig::default(),
        jwt: JwtConfig::new(SECRET),
        storage: StorageBackend::InMemory,
        environment: Environment::Development,
    };
    let state = AppState::new(config, Storage::InMemory(InMemoryUserRepository::seeded()));
    build_router(&state).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Request::post("/login").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_users_require_token() {
    let app = app();

    let (status, body) = send(&app, Request::get("/api/users").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = app();

    let (status, _) = send(&app, authed("GET", "/api/users", "not-a-jwt", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let app = app();
    let foreign = axum_helpers::JwtAuth::new(&JwtConfig::new(
        "a-completely-different-secret-of-32-chars",
    ))
    .create_token(LOGIN_SUBJECT, 60)
    .unwrap();

    let (status, _) = send(&app, authed("GET", "/api/users", &foreign, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_token_grants_access() {
    let app = app();
    let token = login(&app).await;

    let (status, body) = send(&app, authed("GET", "/api/users", &token, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": 1, "name": "John", "surname": "Doe"},
            {"id": 2, "name": "Jane", "surname": "Doe"},
            {"id": 3, "name": "Alice", "surname": "Smith"}
        ])
    );
}

#[tokio::test]
async fn test_crud_through_full_stack() {
    let app = app();
    let token = login(&app).await;

    let (status, created) = send(
        &app,
        authed(
            "POST",
            "/api/users",
            &token,
            Some(json!({"name": "John2", "surname": "Doe2"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({"id": 4, "name": "John2", "surname": "Doe2"}));

    let (status, updated) = send(
        &app,
        authed(
            "PUT",
            "/api/users/4",
            &token,
            Some(json!({"name": "John3", "surname": "Doe3"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, json!({"id": 4, "name": "John3", "surname": "Doe3"}));

    let (status, _) = send(&app, authed("DELETE", "/api/users/4", &token, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, authed("GET", "/api/users/4", &token, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app();

    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["name"], "users_api");
}

#[tokio::test]
async fn test_ready_reports_in_memory_store() {
    let app = app();

    let (status, body) = send(&app, Request::get("/ready").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "in_memory");
}

#[tokio::test]
async fn test_openapi_documents_users_and_login() {
    let app = app();

    let (status, doc) = send(
        &app,
        Request::get("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/login"]["post"].is_object());
    assert!(doc["paths"]["/api/users"]["get"].is_object());
    assert!(doc["paths"]["/api/users/{id}"]["delete"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = app();

    let (status, body) = send(&app, Request::get("/nope").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}
