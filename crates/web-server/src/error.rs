use analytics::{AnalyticsError, LoadError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use serde_json::json;
use thiserror::Error;
use views::ViewError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dataset unavailable: {0}")]
    Load(#[from] LoadError),
    #[error("View error: {0}")]
    View(#[from] ViewError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Load(load_err) => {
                tracing::error!(error = %load_err, "Dataset load failed.");
                (StatusCode::SERVICE_UNAVAILABLE, load_err.to_string())
            }
            AppError::View(ViewError::Analytics(AnalyticsError::Load(load_err))) => {
                tracing::error!(error = %load_err, "Dataset load failed.");
                (StatusCode::SERVICE_UNAVAILABLE, load_err.to_string())
            }
            AppError::View(view_err @ (ViewError::Core(_) | ViewError::UnsupportedMetric(_))) => {
                tracing::error!(error = %view_err, "Rejected view request.");
                (StatusCode::BAD_REQUEST, view_err.to_string())
            }
            AppError::View(view_err) => {
                tracing::error!(error = ?view_err, "View error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while building the view".to_string(),
                )
            }
            AppError::BadRequest(message) => {
                tracing::error!(error = %message, "Rejected request.");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Task(join_err) => {
                tracing::error!(error = %join_err, "Dataset task failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while loading the dataset".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
