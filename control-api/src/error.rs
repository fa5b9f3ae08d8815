use axum::response::{IntoResponse, Response};
use axum::{http::StatusCode, Json};
use common::{pipeline::PipelineKind, ConfigError, PipelineError};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;

/// Represents a runtime error that needs to be mapped
/// to an HTTP response
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    MalformedConfig(#[from] ConfigError),
    #[error("cluster {kind} failed: {source}")]
    Pipeline {
        kind: PipelineKind,
        #[source]
        source: PipelineError,
    },
    #[error("pipeline task did not complete: {0}")]
    PipelineTask(#[from] JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let description = self.to_string();
        tracing::error!("Error from control API: {}", description);

        let (message, error) = match self {
            AppError::MalformedConfig(_) => {
                return (StatusCode::BAD_REQUEST, description).into_response();
            }
            AppError::Pipeline { kind, source } => (kind.failed_message(&source), source.to_string()),
            AppError::PipelineTask(e) => ("Pipeline task failed".to_string(), e.to_string()),
        };

        let body = Json(json!({
            "message": message,
            "error": error,
            "code": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
