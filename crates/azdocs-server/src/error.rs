use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use azdocs_shared::protocol::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("File too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Upload storage error: {0}")]
    Storage(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::PayloadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ServerError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upload storage error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, axum::Json(ErrorBody::new(message))).into_response()
    }
}
