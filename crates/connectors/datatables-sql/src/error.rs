//! Errors returned over HTTP.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use query_engine_execution::error::Error as ExecutionError;
use query_engine_models::models;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] models::Error),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("Unable to encode metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Execution(err)
                if err.is_invalid_argument() || err.is_translator_not_found() =>
            {
                StatusCode::BAD_REQUEST
            }
            ServerError::Execution(_) | ServerError::Metrics(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(serde_json::json!({ "message": self.to_string() })),
        )
            .into_response()
    }
}
