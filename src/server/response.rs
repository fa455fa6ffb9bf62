use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// API error that converts to a proper HTTP response
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Maps the error taxonomy onto HTTP statuses. Store and filesystem
/// failures keep their detail in the logs; callers only ever see the
/// generic kind.
impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound => ApiError::not_found("not found"),
            Error::AlreadyExists => ApiError::conflict("already exists"),
            Error::InvalidCredentials => ApiError::unauthorized("invalid login or password"),
            Error::InvalidToken => ApiError::unauthorized("invalid or expired token"),
            Error::BadRequest(message) => ApiError::bad_request(message),
            Error::Database(e) => {
                tracing::error!("database error: {e}");
                ApiError::internal("database error")
            }
            Error::Io(e) => {
                tracing::error!("storage error: {e}");
                ApiError::internal("storage error")
            }
            Error::Config(e) => {
                tracing::error!("configuration error: {e}");
                ApiError::internal("internal server error")
            }
        }
    }
}
