#![cfg(feature = "axum")]

use axum::response::IntoResponse;
use http::StatusCode;
use http_body_util::BodyExt;
use recordkit_service::{ResponseEnvelope, Verb, FAILURE_MESSAGE};
use serde_json::{json, Value};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn envelope_status_becomes_http_status() {
    let envelope = ResponseEnvelope::success(StatusCode::CREATED, Verb::Post, "created", json!({ "id": 7 }));
    let response = envelope.into_response();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(
        body_json(response).await,
        json!({
            "statusCode": 201,
            "status": "SUCCESS",
            "method": "POST",
            "message": "created",
            "data": { "id": 7 }
        })
    );
}

#[tokio::test]
async fn failed_envelope_keeps_null_data() {
    let message = format!("{FAILURE_MESSAGE}Not found: no row");
    let response = ResponseEnvelope::<Value>::failure(StatusCode::INTERNAL_SERVER_ERROR, Verb::Get, message.clone())
        .into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body["message"], message);
    assert!(body["data"].is_null());
}
