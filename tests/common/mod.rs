#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::json;
use sqlx::SqlitePool;
use tickbox::auth::{RegisterResponse, TokenResponse, TokenService};
use tickbox::config::Config;
use tickbox::{db, routes};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test config should be valid")
}

pub fn test_tokens() -> TokenService {
    let config = test_config();
    TokenService::new(&config.jwt_secret, config.access_token_ttl)
}

/// Fresh in-memory database with the schema applied.
pub async fn test_pool() -> SqlitePool {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::init_schema(&pool)
        .await
        .expect("Failed to create schema");
    pool
}

/// Builds the full application against its own empty database.
pub async fn spawn_app() -> (
    impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    SqlitePool,
) {
    let pool = test_pool().await;
    (spawn_app_with_pool(pool.clone()).await, pool)
}

/// Builds the full application on top of an already initialised pool.
pub async fn spawn_app_with_pool(
    pool: SqlitePool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(test_config()))
            .app_data(web::Data::new(test_tokens()))
            .configure(routes::config),
    )
    .await
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub fn register_payload(username: &str, role: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "first_name": "Test",
        "last_name": "User",
        "password": format!("{}-password", username),
        "role": role
    })
}

/// Registers `username` (password `<username>-password`) and returns the new id.
pub async fn register_user<S, B>(app: &S, username: &str, role: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/")
        .set_json(register_payload(username, role))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        StatusCode::CREATED,
        "registration of {} failed",
        username
    );
    let body: RegisterResponse = test::read_body_json(resp).await;
    body.user_id
}

pub fn login_request(username: &str, password: &str) -> Request {
    test::TestRequest::post()
        .uri("/auth/token")
        .set_form([("username", username), ("password", password)])
        .to_request()
}

/// Logs in with the given credentials and returns the access token.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, login_request(username, password)).await;
    assert_eq!(resp.status(), StatusCode::OK, "login of {} failed", username);
    let body: TokenResponse = test::read_body_json(resp).await;
    assert_eq!(body.token_type, "bearer");
    body.access_token
}

/// Registers and logs in, returning `(user_id, token)`.
pub async fn register_and_login<S, B>(app: &S, username: &str, role: &str) -> (i64, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let user_id = register_user(app, username, role).await;
    let token = login(app, username, &format!("{}-password", username)).await;
    (user_id, token)
}

/// Creates a to-do item as the token holder and returns its id.
pub async fn create_todo<S, B>(app: &S, token: &str, title: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/todos/todo")
        .insert_header(bearer(token))
        .set_json(json!({
            "title": title,
            "description": "created by a test",
            "priority": 3,
            "complete": false
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["todo"]["id"].as_i64().expect("created todo has an id")
}
