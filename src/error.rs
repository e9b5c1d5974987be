use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Coarse classification used by callers that only care about who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Remote,
    Timeout,
    Canceled,
    Internal,
}

#[derive(Debug, Error)]
pub enum DatasourceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("KairosDB returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Result mismatch: submitted {expected} queries, received {actual} result sets")]
    ResultMismatch { expected: usize, actual: usize },

    #[error("Query timed out: {0}")]
    Timeout(String),

    #[error("Query canceled")]
    Canceled,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DatasourceError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DatasourceError::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DatasourceError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DatasourceError::Remote { .. }
            | DatasourceError::Transport(_)
            | DatasourceError::ResultMismatch { .. } => ErrorKind::Remote,
            DatasourceError::Timeout(_) => ErrorKind::Timeout,
            DatasourceError::Canceled => ErrorKind::Canceled,
            DatasourceError::Serialization(_)
            | DatasourceError::Config(_)
            | DatasourceError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::Remote => StatusCode::BAD_GATEWAY,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            // nginx's "client closed request"
            ErrorKind::Canceled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for DatasourceError {
    fn from(err: serde_json::Error) -> Self {
        DatasourceError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for DatasourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DatasourceError::Timeout(err.to_string())
        } else if err.is_decode() {
            DatasourceError::Serialization(err.to_string())
        } else {
            DatasourceError::Transport(err.to_string())
        }
    }
}

impl IntoResponse for DatasourceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DatasourceError>;
