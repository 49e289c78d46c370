use crate::error::{Error, ErrorType};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

const INVALID_CATEGORY: &str = "Invalid transaction type.";
const NOT_FOUND: &str = "Transaction not found.";
const INTERNAL: &str = "Internal server error.";

/// An error response. Serialized as `{"detail": "..."}`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ApiError {
    status: StatusCode,
    detail: String,
}

#[derive(Serialize)]
struct Detail<'a> {
    detail: &'a str,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e.error_type() {
            ErrorType::InvalidCategory => ApiError::new(StatusCode::BAD_REQUEST, INVALID_CATEGORY),
            ErrorType::NotFound => ApiError::new(StatusCode::NOT_FOUND, NOT_FOUND),
            ErrorType::Request => ApiError::new(StatusCode::BAD_REQUEST, e.to_string()),
            ErrorType::Storage | ErrorType::Config | ErrorType::Internal => {
                error!("{e}");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(Detail {
            detail: &self.detail,
        });
        (self.status, body).into_response()
    }
}
