// src/api/error.rs
// Error envelope every handler returns: {error, message, status, error_code?}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use tracing::error;

/// What every handler's fallible body evaluates to.
pub type ApiResult<T> = Result<T, ApiError>;

/// An HTTP-facing error: the public message plus the status it maps to.
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
}

impl ApiError {
    fn with_code(status_code: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: Some(code.to_string()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// std::error::Error so anyhow can convert from it where handlers mix sources.
impl std::error::Error for ApiError {}

/// Wire shape of an error response. `error` is always true so clients can
/// branch on the body without inspecting the status line.
#[derive(Serialize)]
struct ErrorBody {
    error: bool,
    message: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: true,
            message: self.message,
            status: self.status_code.as_u16(),
            error_code: self.error_code,
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// Converts any Debug-printable error into a logged 500 with a stable public
/// message. The underlying detail goes to the log, never to the client.
pub trait IntoApiError<T> {
    fn into_api_error(self, message: &str) -> Result<T, ApiError>;
}

impl<T, E> IntoApiError<T> for Result<T, E>
where
    E: std::fmt::Debug,
{
    fn into_api_error(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            error!("{}: {:?}", message, e);
            ApiError::internal(message)
        })
    }
}

/// Missing-row helpers for `Option` lookups.
pub trait IntoApiErrorOption<T> {
    fn ok_or_not_found(self, message: &str) -> Result<T, ApiError>;
    fn ok_or_bad_request(self, message: &str) -> Result<T, ApiError>;
}

impl<T> IntoApiErrorOption<T> for Option<T> {
    fn ok_or_not_found(self, message: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }

    fn ok_or_bad_request(self, message: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::bad_request(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn envelope_carries_flag_message_and_code() {
        let response = ApiError::bad_request("Name and system prompt are required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "Name and system prompt are required");
        assert_eq!(body["status"], 400);
        assert_eq!(body["error_code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn internal_errors_hide_the_underlying_detail() {
        let result: Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        let error = result.into_api_error("Failed to fetch settings").unwrap_err();
        assert_eq!(error.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Failed to fetch settings");

        let body = body_json(error.into_response()).await;
        assert_eq!(body["message"], "Failed to fetch settings");
        assert!(!body["message"].as_str().unwrap().contains("RowNotFound"));
    }

    #[test]
    fn option_helpers_pick_the_right_status() {
        let missing: Option<i64> = None;
        assert_eq!(
            missing
                .ok_or_not_found("Persona not found")
                .unwrap_err()
                .status_code,
            StatusCode::NOT_FOUND
        );

        let missing: Option<i64> = None;
        assert_eq!(
            missing
                .ok_or_bad_request("Conversation ID is required")
                .unwrap_err()
                .status_code,
            StatusCode::BAD_REQUEST
        );

        assert_eq!(Some(7).ok_or_not_found("unused").unwrap(), 7);
    }
}
