//! Tests for the error-to-response mapping.
//!
//! Verifies status codes, stable error codes, and that internal database
//! details never leak into response bodies.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

use kongwatch_api::error::AppError;

async fn error_to_response(error: AppError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

/// Validation failures map to 400 with the offending detail.
#[tokio::test]
async fn validation_error_maps_to_bad_request() {
    let error = AppError::Validation("email_default_sender is not a valid email address".into());
    let (status, body) = error_to_response(error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("email_default_sender"));
}

/// A missing row maps to 404 with a generic message.
#[tokio::test]
async fn row_not_found_maps_to_not_found() {
    let error = AppError::Database(sqlx::Error::RowNotFound);
    let (status, body) = error_to_response(error).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], "Resource not found");
}

/// Other database failures map to 500 without leaking driver details.
#[tokio::test]
async fn unexpected_database_error_is_sanitized() {
    let error = AppError::Database(sqlx::Error::PoolClosed);
    let (status, body) = error_to_response(error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"], "An internal error occurred");
    assert!(!body["error"].as_str().unwrap().contains("pool"));
}
