//! HTTP error responses.
//!
//! Every failure leaves the service as `{ "error": <reason>, "message": <text> }`.
//! Server-side failures are logged in full and answered with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use taskd_core::domain::{ErrorKind, TaskdError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] TaskdError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Domain(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::Invalid => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Timeout | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Text shown to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Domain(e) if e.is_not_found() => "task not found".to_string(),
            Self::Domain(e) if self.status_code().is_server_error() => {
                error!(error = %e, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use std::time::Duration;
    use taskd_core::domain::TaskId;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(TaskdError::Unauthenticated("invalid credentials".into()), StatusCode::UNAUTHORIZED)]
    #[case(TaskdError::Forbidden("no".into()), StatusCode::FORBIDDEN)]
    #[case(TaskdError::Invalid("bad".into()), StatusCode::BAD_REQUEST)]
    #[case(TaskdError::Conflict("dup".into()), StatusCode::CONFLICT)]
    #[case(TaskdError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(TaskdError::Timeout { op: "find_all", after: Duration::from_secs(10) }, StatusCode::INTERNAL_SERVER_ERROR)]
    fn domain_errors_map_to_status(#[case] err: TaskdError, #[case] expected: StatusCode) {
        assert_eq!(ApiError::from(err).status_code(), expected);
    }

    #[tokio::test]
    async fn not_found_body() {
        let id: TaskId = "task-01ARZ3NDEKTSV4RRFFQ69G5FAV".parse().unwrap();
        let (status, json) = body_of(TaskdError::NotFound(id).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Not Found");
        assert_eq!(json["message"], "task not found");
    }

    #[tokio::test]
    async fn server_errors_hide_detail() {
        let (status, json) = body_of(TaskdError::Internal("disk on fire".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "internal server error");
    }

    #[tokio::test]
    async fn conflict_body_keeps_the_reason() {
        let (status, json) = body_of(
            TaskdError::Conflict("user with this email already exists".into()).into(),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Conflict");
        assert_eq!(json["message"], "user with this email already exists");
    }

    #[tokio::test]
    async fn unauthorized_body() {
        let (status, json) = body_of(ApiError::unauthorized("missing authorization header")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Unauthorized");
        assert_eq!(json["message"], "missing authorization header");
    }
}
