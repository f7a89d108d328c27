use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{db::DbError, models::MessageResponse};

/// ApiError
///
/// Every failure a handler can report. Each variant maps to exactly one HTTP
/// status and a `{"message": ...}` body; internal details never reach the client.
#[derive(Debug)]
pub enum ApiError {
    /// 401: no `Authorization` header at all.
    MissingCredentials,
    /// 403: the token did not verify, or its role is not allowed here.
    Forbidden,
    /// 400: a request field failed validation.
    Validation {
        field: &'static str,
        message: String,
    },
    /// 404
    NotFound(&'static str),
    /// 503: a dependency is down (health checks only).
    Unavailable(&'static str),
    /// 500: the detail is logged server-side and dropped from the response.
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The body sent to the client.
    pub fn body(&self) -> MessageResponse {
        match self {
            ApiError::MissingCredentials => MessageResponse::new("Authorization header required"),
            ApiError::Forbidden => MessageResponse::new("Unauthorized"),
            ApiError::Validation { field, message } => MessageResponse {
                message: message.clone(),
                field: Some(field.to_string()),
            },
            ApiError::NotFound(what) => MessageResponse::new(format!("{} not found", what)),
            ApiError::Unavailable(what) => MessageResponse::new(format!("{} unavailable", what)),
            ApiError::Internal(_) => MessageResponse::new("Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

// Extractor rejections carry serde detail; only a fixed message reaches the client.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        ApiError::Validation {
            field: "body",
            message: "Request body must be a JSON object".to_string(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected path parameter");
        ApiError::Validation {
            field: "id",
            message: "Path parameter must be an integer id".to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected query string");
        ApiError::Validation {
            field: "query",
            message: "Invalid query string".to_string(),
        }
    }
}
