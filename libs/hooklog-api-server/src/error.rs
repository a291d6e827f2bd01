use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::signature::SignatureError;

/// Why an incoming event could not be accepted.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("could not decode event payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Request failure. The display text is the response body; the source, if
/// any, is only logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("not supported event {0:?}")]
    UnsupportedEvent(String),

    #[error("not supported event action {0:?}")]
    UnsupportedAction(String),

    #[error("bad event")]
    BadEvent(#[source] EventError),

    #[error("topic '{0}' not found")]
    TopicNotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnsupportedEvent(_)
            | ApiError::UnsupportedAction(_)
            | ApiError::BadEvent(_) => StatusCode::BAD_REQUEST,
            ApiError::TopicNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match std::error::Error::source(&self) {
            Some(cause) => tracing::warn!(status = %status, error = %self, cause = %cause, "request failed"),
            None => tracing::warn!(status = %status, error = %self, "request failed"),
        }
        (status, self.to_string()).into_response()
    }
}
