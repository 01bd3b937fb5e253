//! Admin HTTP API Integration Tests
//!
//! These tests drive the router with in-memory storage and verify how
//! outcomes are translated into status codes and JSON bodies.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use idadmin::{
    admin::IdentityAdminManager,
    config::{Config, CorsOrigins},
    http::{AppState, build_router},
    storage::MemoryAdminStorage,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let config = Arc::new(Config {
        version: "test".to_string(),
        http_port: "3000".to_string().try_into().unwrap(),
        http_cors_origins: CorsOrigins::default(),
        storage_backend: "memory".to_string(),
        database_url: None,
        seed_standard_scopes: "false".to_string().try_into().unwrap(),
        client_default_identity_token_lifetime: "5m".to_string().try_into().unwrap(),
        client_default_access_token_lifetime: "1h".to_string().try_into().unwrap(),
        client_default_authorization_code_lifetime: "5m".to_string().try_into().unwrap(),
        client_default_absolute_refresh_token_lifetime: "5m".to_string().try_into().unwrap(),
        client_default_sliding_refresh_token_lifetime: "15d".to_string().try_into().unwrap(),
    });
    let manager = IdentityAdminManager::new(
        Arc::new(MemoryAdminStorage::new()),
        config.client_defaults(),
    );
    build_router(AppState {
        config,
        manager: Arc::new(manager),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
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

async fn create_client(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/clients",
        Some(json!([
            { "type": "ClientId", "value": "app1" },
            { "type": "ClientName", "value": "App One" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["subject"].as_str().unwrap().to_string()
}

fn property<'a>(detail: &'a Value, name: &str) -> Option<&'a str> {
    detail["properties"]
        .as_array()?
        .iter()
        .find(|p| p["type"] == name)?["value"]
        .as_str()
}

#[tokio::test]
async fn test_client_lifecycle_over_http() {
    let app = app();
    let subject = create_client(&app).await;

    let (status, detail) = send(&app, "GET", &format!("/api/clients/{subject}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["client_id"], "app1");
    assert_eq!(property(&detail, "RequireConsent"), Some("true"));

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/clients/{subject}/properties/RequireConsent"),
        Some(json!({ "value": "false" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, detail) = send(&app, "GET", &format!("/api/clients/{subject}"), None).await;
    assert_eq!(property(&detail, "RequireConsent"), Some("false"));

    let (status, _) = send(&app, "DELETE", &format!("/api/clients/{subject}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/clients/{subject}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "errors": ["Invalid subject"] }));
}

#[tokio::test]
async fn test_client_children_over_http() {
    let app = app();
    let subject = create_client(&app).await;

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/clients/{subject}/redirect-uris"),
            Some(json!({ "value": "https://app.example.com/cb" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/clients/{subject}/secrets"),
        Some(json!({ "value": "s3cret", "expiration": "2030-01-01T00:00:00+02:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, detail) = send(&app, "GET", &format!("/api/clients/{subject}"), None).await;
    assert_eq!(detail["redirect_uris"].as_array().unwrap().len(), 1);
    assert_eq!(detail["client_secrets"][0]["type"], "SharedSecret");
    assert_eq!(
        detail["client_secrets"][0]["expiration"],
        "2030-01-01T00:00:00+02:00"
    );

    let uri_id = detail["redirect_uris"][0]["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/clients/{subject}/redirect-uris/{uri_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, detail) = send(&app, "GET", &format!("/api/clients/{subject}"), None).await;
    assert!(detail["redirect_uris"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_failures_are_bad_requests() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/clients",
        Some(json!([{ "type": "ClientName", "value": "No Id" }])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["ClientId is required"] }));

    let subject = create_client(&app).await;
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/clients/{subject}/properties/Nope"),
        Some(json!({ "value": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["Invalid property type Nope"] }));

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/clients/{subject}/scopes/not-an-id"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_client_id_is_a_server_error() {
    let app = app();
    create_client(&app).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/clients",
        Some(json!([
            { "type": "ClientId", "value": "app1" },
            { "type": "ClientName", "value": "Copy" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["errors"][0].as_str().unwrap().contains("error-idadmin-storage-6"));
}

#[tokio::test]
async fn test_scope_endpoints() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/scopes",
        Some(json!([{ "type": "ScopeName", "value": "read" }])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let subject = body["subject"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/scopes/{subject}/claims"),
        Some(json!({ "name": "role" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, detail) = send(&app, "GET", &format!("/api/scopes/{subject}"), None).await;
    let claim_id = detail["scope_claims"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/scopes/{subject}/claims/{claim_id}"),
        Some(json!({ "name": "roles", "always_include_in_id_token": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, detail) = send(&app, "GET", &format!("/api/scopes/{subject}"), None).await;
    assert_eq!(detail["scope_claims"][0]["name"], "roles");
    assert_eq!(detail["scope_claims"][0]["always_include_in_id_token"], true);

    let (status, page) = send(&app, "GET", "/api/scopes?filter=REA&start=0&count=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "read");

    let (status, page) = send(&app, "GET", "/api/scopes?filter=zzz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"], json!([]));
}

#[tokio::test]
async fn test_metadata_endpoint() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/metadata", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["supports_create"], true);
    assert_eq!(body["client"]["create_properties"][0]["type"], "ClientName");
    assert_eq!(body["client"]["create_properties"][0]["required"], true);
    assert_eq!(body["scope"]["create_properties"][0]["type"], "ScopeName");
}
