//! In-process tests of the HTTP contract over the in-memory backend, plus a
//! repository that fails on purpose for the 5xx paths.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::ServerConfig;
use models::errors::ModelError;
use sea_orm::DbErr;
use serde_json::{json, Value};
use service::errors::ServiceError;
use service::user::repo::InMemoryUserRepository;
use service::user::{User, UserFields, UserRepository};
use tower::ServiceExt;
use uuid::Uuid;

const BIO_20: &str = "Twenty characters ok";

fn app() -> Router {
    server::build_app(Arc::new(InMemoryUserRepository::new()), &ServerConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Vec<u8>>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(bytes) => builder.header("content-type", "application/json").body(Body::from(bytes))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

async fn send_json(app: &Router, method: &str, uri: &str, body: &Value) -> anyhow::Result<(StatusCode, Value)> {
    send(app, method, uri, Some(serde_json::to_vec(body)?)).await
}

fn user_body(first: &str, last: &str, bio: &str) -> Value {
    json!({ "first_name": first, "last_name": last, "biography": bio })
}

async fn create(app: &Router, first: &str, last: &str, bio: &str) -> anyhow::Result<Value> {
    let (status, body) = send_json(app, "POST", "/user", &user_body(first, last, bio)).await?;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    Ok(body["data"].clone())
}

#[tokio::test]
async fn create_returns_201_with_generated_id() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send_json(&app, "POST", "/user", &user_body("Al", "Bo", BIO_20)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("error").is_none());
    let id = body["data"]["id"].as_str().expect("id string");
    Uuid::parse_str(id)?;
    assert_eq!(body["data"]["first_name"], "Al");
    assert_eq!(body["data"]["last_name"], "Bo");
    assert_eq!(body["data"]["biography"], BIO_20);
    Ok(())
}

#[tokio::test]
async fn create_then_get_round_trips_fields() -> anyhow::Result<()> {
    let app = app();
    let bio = "Fond of ünïcode, emoji 🚀 and long walks.";
    let created = create(&app, "Zoë", "O'Neil", bio).await?;
    let id = created["id"].as_str().expect("id");

    let (status, first) = send(&app, "GET", &format!("/user/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"], created);

    let (_, second) = send(&app, "GET", &format!("/user/{id}"), None).await?;
    assert_eq!(second, first);
    Ok(())
}

#[tokio::test]
async fn ids_are_unique_across_creates() -> anyhow::Result<()> {
    let app = app();
    let mut ids = std::collections::HashSet::new();
    for _ in 0..20 {
        let created = create(&app, "Al", "Bo", BIO_20).await?;
        ids.insert(created["id"].as_str().expect("id").to_string());
    }
    assert_eq!(ids.len(), 20);
    Ok(())
}

#[tokio::test]
async fn biography_bounds() -> anyhow::Result<()> {
    let app = app();
    for len in [20, 450] {
        let (status, _) = send_json(&app, "POST", "/user", &user_body("Al", "Bo", &"b".repeat(len))).await?;
        assert_eq!(status, StatusCode::CREATED, "len {len}");
    }
    for len in [19, 451] {
        let (status, body) = send_json(&app, "POST", "/user", &user_body("Al", "Bo", &"b".repeat(len))).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "len {len}");
        assert_eq!(body, json!({ "error": "Biography must have between 20 to 450 characters." }));
    }
    Ok(())
}

#[tokio::test]
async fn name_bounds() -> anyhow::Result<()> {
    let app = app();
    for name in ["ab".to_string(), "n".repeat(20)] {
        let (status, _) = send_json(&app, "POST", "/user", &user_body(&name, "Bo", BIO_20)).await?;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send_json(&app, "POST", "/user", &user_body("Al", &name, BIO_20)).await?;
        assert_eq!(status, StatusCode::CREATED);
    }
    for name in ["a".to_string(), "n".repeat(21)] {
        let (status, body) = send_json(&app, "POST", "/user", &user_body(&name, "Bo", BIO_20)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "First name must have between 2 to 20 characters.");
        let (status, body) = send_json(&app, "POST", "/user", &user_body("Al", &name, BIO_20)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Last name must have between 2 to 20 characters.");
    }
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_validation_errors() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send_json(&app, "POST", "/user", &json!({ "first_name": "Al" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Biography must have between 20 to 450 characters.");
    Ok(())
}

#[tokio::test]
async fn bio_alias_is_accepted_and_body_id_ignored() -> anyhow::Result<()> {
    let app = app();
    let chosen = Uuid::new_v4();
    let body = json!({ "id": chosen, "first_name": "Al", "last_name": "Bo", "bio": BIO_20 });
    let (status, body) = send_json(&app, "POST", "/user", &body).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["biography"], BIO_20);
    assert_ne!(body["data"]["id"], chosen.to_string());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_422() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send(&app, "POST", "/user", Some(b"{\"first_name\": ".to_vec())).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "error": "Invalid body." }));

    let (status, _) = send_json(&app, "POST", "/user", &json!({ "first_name": 42 })).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_413() -> anyhow::Result<()> {
    let app = app();
    let huge = user_body("Al", "Bo", &"b".repeat(10_001));
    let (status, body) = send_json(&app, "POST", "/user", &huge).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "Body too large." }));

    let (status, _) = send_json(&app, "PUT", &format!("/user/{}", Uuid::new_v4()), &huge).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn get_unknown_id_is_404() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send(&app, "GET", &format!("/user/{}", Uuid::new_v4()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found." }));
    Ok(())
}

#[tokio::test]
async fn malformed_id_is_400() -> anyhow::Result<()> {
    let app = app();
    for (method, body) in [("GET", None), ("DELETE", None)] {
        let (status, resp) = send(&app, method, "/user/not-a-uuid", body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(resp, json!({ "error": "Invalid UUID." }));
    }
    let (status, resp) = send_json(&app, "PUT", "/user/not-a-uuid", &user_body("Al", "Bo", BIO_20)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp, json!({ "error": "Invalid UUID." }));
    Ok(())
}

#[tokio::test]
async fn put_checks_body_before_id() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send_json(&app, "PUT", "/user/not-a-uuid", &user_body("A", "Bo", BIO_20)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "First name must have between 2 to 20 characters.");

    let (status, _) = send(&app, "PUT", "/user/not-a-uuid", Some(b"nope".to_vec())).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn put_replaces_all_fields_and_keeps_id() -> anyhow::Result<()> {
    let app = app();
    let created = create(&app, "Al", "Bo", BIO_20).await?;
    let id = created["id"].as_str().expect("id").to_string();

    let other_id = Uuid::new_v4();
    let mut body = user_body("Cy", "Di", "A brand new biography here.");
    body["id"] = json!(other_id);
    let (status, updated) = send_json(&app, "PUT", &format!("/user/{id}"), &body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["id"], id);
    assert_eq!(updated["data"]["first_name"], "Cy");
    assert_eq!(updated["data"]["last_name"], "Di");
    assert_eq!(updated["data"]["biography"], "A brand new biography here.");

    let (_, fetched) = send(&app, "GET", &format!("/user/{id}"), None).await?;
    assert_eq!(fetched["data"], updated["data"]);
    Ok(())
}

#[tokio::test]
async fn put_on_unknown_id_is_404_and_changes_nothing() -> anyhow::Result<()> {
    let app = app();
    let created = create(&app, "Al", "Bo", BIO_20).await?;

    let (status, body) =
        send_json(&app, "PUT", &format!("/user/{}", Uuid::new_v4()), &user_body("Cy", "Di", BIO_20)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found." }));

    let (_, list) = send(&app, "GET", "/users", None).await?;
    assert_eq!(list["data"], json!([created]));
    Ok(())
}

#[tokio::test]
async fn delete_then_get_is_404() -> anyhow::Result<()> {
    let app = app();
    let created = create(&app, "Al", "Bo", BIO_20).await?;
    let uri = format!("/user/{}", created["id"].as_str().expect("id"));

    let (status, body) = send(&app, "DELETE", &uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created);

    let (status, _) = send(&app, "GET", &uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", &uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found." }));
    Ok(())
}

#[tokio::test]
async fn list_is_empty_array_then_all_users() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send(&app, "GET", "/users", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [] }));

    let a = create(&app, "Al", "Bo", BIO_20).await?;
    let b = create(&app, "Cy", "Di", BIO_20).await?;
    let (_, body) = send(&app, "GET", "/users", None).await?;
    let listed = body["data"].as_array().expect("array");
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&a));
    assert!(listed.contains(&b));
    Ok(())
}

#[tokio::test]
async fn responses_are_json() -> anyhow::Result<()> {
    let app = app();
    let req = Request::builder().method("GET").uri("/users").body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.headers()["content-type"], "application/json");
    Ok(())
}

#[tokio::test]
async fn health_and_openapi_are_served() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/user/{id}").is_some());
    Ok(())
}

#[tokio::test]
async fn undecodable_id_gets_the_envelope() -> anyhow::Result<()> {
    let app = app();
    for method in ["GET", "DELETE"] {
        let req = Request::builder().method(method).uri("/user/%FF").body(Body::empty())?;
        let resp = app.clone().oneshot(req).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(resp.headers()["content-type"], "application/json");
        let body: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await?)?;
        assert_eq!(body, json!({ "error": "Invalid UUID." }));
    }

    let (status, body) = send_json(&app, "PUT", "/user/%FF", &user_body("Al", "Bo", BIO_20)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid UUID." }));

    let (status, body) = send(&app, "PUT", "/user/%FF", Some(b"nope".to_vec())).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "error": "Invalid body." }));
    Ok(())
}

const DB_DETAIL: &str = "connection refused: relation \"users\" is gone";

#[derive(Clone, Copy)]
enum Fault {
    Fail,
    Panic,
    Stall,
}

/// Repository whose every call misbehaves in the chosen way.
struct BrokenRepository(Fault);

impl BrokenRepository {
    async fn trip<T: Send>(&self) -> Result<T, ServiceError> {
        match self.0 {
            Fault::Fail => Err(ServiceError::Model(ModelError::Db(DbErr::Custom(DB_DETAIL.into())))),
            Fault::Panic => panic!("storage adapter panicked"),
            Fault::Stall => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ServiceError::not_found("user"))
            }
        }
    }
}

#[async_trait]
impl UserRepository for BrokenRepository {
    async fn create(&self, _fields: UserFields) -> Result<User, ServiceError> { self.trip().await }
    async fn get(&self, _id: Uuid) -> Result<Option<User>, ServiceError> { self.trip().await }
    async fn list(&self) -> Result<Vec<User>, ServiceError> { self.trip().await }
    async fn update(&self, _id: Uuid, _fields: UserFields) -> Result<Option<User>, ServiceError> { self.trip().await }
    async fn delete(&self, _id: Uuid) -> Result<Option<User>, ServiceError> { self.trip().await }
}

fn broken_app(fault: Fault) -> Router {
    server::build_app(Arc::new(BrokenRepository(fault)), &ServerConfig::default())
}

#[tokio::test]
async fn storage_failures_are_500_with_per_operation_messages() -> anyhow::Result<()> {
    let app = broken_app(Fault::Fail);
    let user_uri = format!("/user/{}", Uuid::new_v4());
    let valid = serde_json::to_vec(&user_body("Al", "Bo", BIO_20))?;
    let cases = [
        ("POST", "/user", Some(valid.clone()), "User creation failed."),
        ("GET", user_uri.as_str(), None, "Something went wrong."),
        ("GET", "/users", None, "Could not list users."),
        ("PUT", user_uri.as_str(), Some(valid.clone()), "User update failed."),
        ("DELETE", user_uri.as_str(), None, "Could not delete user."),
    ];
    for (method, uri, body, message) in cases {
        let (status, resp) = send(&app, method, uri, body).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(resp, json!({ "error": message }), "{method} {uri}");
        assert!(!resp.to_string().contains("connection refused"), "{method} {uri} leaked detail");
    }
    Ok(())
}

#[tokio::test]
async fn handler_panic_becomes_500_envelope() -> anyhow::Result<()> {
    let app = broken_app(Fault::Panic);
    let (status, body) = send(&app, "GET", "/users", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Something went wrong." }));

    // the router keeps serving after a panic
    let (status, _) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn slow_storage_times_out_with_envelope() -> anyhow::Result<()> {
    let app = broken_app(Fault::Stall);
    let (status, body) = send(&app, "GET", "/users", None).await?;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({ "error": "Request timed out." }));
    Ok(())
}

#[tokio::test]
async fn request_id_is_generated_or_echoed() -> anyhow::Result<()> {
    let app = app();
    let req = Request::builder().uri("/users").body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    let generated = resp.headers()["x-request-id"].to_str()?;
    Uuid::parse_str(generated)?;

    let req = Request::builder()
        .uri("/users")
        .header("x-request-id", "client-chosen-id")
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.headers()["x-request-id"], "client-chosen-id");
    Ok(())
}
