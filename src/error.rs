use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::manager::session_manager;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage failure: {0}")]
    Storage(#[from] session_manager::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Une erreur interne est survenue.").into_response()
    }
}
