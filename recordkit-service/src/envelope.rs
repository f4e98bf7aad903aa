use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Prefix of every successful message except deletes.
pub const SUCCESS_MESSAGE: &str = "Successfully processed the request. ";
/// Prefix of every failure message.
pub const FAILURE_MESSAGE: &str = "Error occurred while interacting with database. ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Success,
    Failed,
}

/// HTTP verb the operation corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

/// Payload wrapper of create and update requests: `{ "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope<D> {
    pub data: D,
}

impl<D> RequestEnvelope<D> {
    pub fn new(data: D) -> Self {
        Self { data }
    }
}

/// Uniform answer of every service operation.
///
/// ```json
/// { "statusCode": 201, "status": "SUCCESS", "method": "POST",
///   "message": "Successfully processed the request. Created Person successfully",
///   "data": { "id": 1, "name": "Ada" } }
/// ```
///
/// A failed envelope never carries data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    status_code: u16,
    status: Outcome,
    method: Verb,
    message: String,
    data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(status: StatusCode, method: Verb, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            status: Outcome::Success,
            method,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(status: StatusCode, method: Verb, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            status: Outcome::Failed,
            method,
            message: message.into(),
            data: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn status(&self) -> Outcome {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == Outcome::Success
    }

    pub fn method(&self) -> Verb {
        self.method
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for ResponseEnvelope<T> {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_camel_case_with_upper_tags() {
        let envelope = ResponseEnvelope::success(StatusCode::CREATED, Verb::Post, "ok", json!({ "id": 1 }));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "statusCode": 201,
                "status": "SUCCESS",
                "method": "POST",
                "message": "ok",
                "data": { "id": 1 }
            })
        );
    }

    #[test]
    fn failure_has_null_data() {
        let envelope = ResponseEnvelope::<u32>::failure(StatusCode::BAD_REQUEST, Verb::Put, "nope");
        assert!(!envelope.is_success());
        assert_eq!(envelope.status_code(), StatusCode::BAD_REQUEST);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["data"], serde_json::Value::Null);
        assert_eq!(value["status"], "FAILED");
    }

    #[test]
    fn request_envelope_reads_data() {
        let request: RequestEnvelope<serde_json::Value> =
            serde_json::from_value(json!({ "data": { "name": "Ada" } })).unwrap();
        assert_eq!(request.data["name"], "Ada");
    }
}
