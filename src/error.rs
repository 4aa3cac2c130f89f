use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Api Error
///
/// Unified error type returned by every handler. Each variant maps to one
/// HTTP status, and the response body is always the standard
/// `{"success": false, "message": ...}` envelope, so no failure reaches a
/// client as an unhandled fault.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired credentials, or a disabled account.
    #[error("{0}")]
    Authentication(String),

    /// Acting on another user's resource.
    #[error("You do not have permission to modify this resource")]
    Forbidden,

    /// Unknown id. Carries the resource kind for the message.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Image credentials are absent from the configuration.
    #[error("Image uploads are not configured on this server")]
    UploadsDisabled,

    /// The hosted image service failed or returned garbage.
    #[error("Image service error: {0}")]
    Upstream(String),

    /// Any other database failure. The cause is logged, never sent to the
    /// client.
    #[error("Internal server error")]
    Database(sqlx::Error),

    /// Anything else that should never happen (token signing, body IO).
    /// The cause is logged, never sent to the client.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        ApiError::Authentication(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::UploadsDisabled => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource"),
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(err) => tracing::error!(error = %err, "database failure"),
            ApiError::Internal(cause) => tracing::error!(%cause, "internal failure"),
            _ => {}
        }

        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
