//! In-process router tests for the gates that run before storage:
//! authentication, collection resolution, and input validation.

mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::OnceLock;
use tower::ServiceExt;
use uuid::Uuid;

use workbench_api::auth::{generate_jwt, Claims};
use workbench_api::server;

fn setup() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        // Must be set before the config singleton is first read; forcing
        // the read here keeps it on a single thread
        std::env::set_var("JWT_SECRET", common::jwt_secret());
        let _ = workbench_api::config::config();
    });
}

fn bearer_token() -> String {
    generate_jwt(Claims::new(Uuid::new_v4(), "guard@workbench.test".to_string())).expect("token")
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn list_without_token_is_unauthorized() -> Result<()> {
    setup();
    let app = server::app();

    let response = app
        .oneshot(Request::builder().uri("/api/builds").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_unauthorized() -> Result<()> {
    setup();
    let app = server::app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/builds")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_collection_is_not_found() -> Result<()> {
    setup();
    let app = server::app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/widgets")
                .header(header::AUTHORIZATION, format!("Bearer {}", bearer_token()))
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_record_id_is_not_found() -> Result<()> {
    setup();
    let app = server::app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/builds/not-a-uuid")
                .header(header::AUTHORIZATION, format!("Bearer {}", bearer_token()))
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn empty_required_field_fails_validation() -> Result<()> {
    setup();
    let app = server::app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/builds")
                .header(header::AUTHORIZATION, format!("Bearer {}", bearer_token()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"version": ""}"#))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["version"].is_string(), "missing field detail: {}", body);
    Ok(())
}

#[tokio::test]
async fn unknown_field_fails_validation() -> Result<()> {
    setup();
    let app = server::app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/keys")
                .header(header::AUTHORIZATION, format!("Bearer {}", bearer_token()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "deploy", "owner": "someone"}"#))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await?;
    assert!(body["field_errors"]["owner"].is_string(), "missing field detail: {}", body);
    Ok(())
}

#[tokio::test]
async fn dashboard_requires_auth() -> Result<()> {
    setup();
    let app = server::app();

    let response = app
        .oneshot(Request::builder().uri("/api/dashboard").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn root_is_public() -> Result<()> {
    setup();
    let app = server::app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
