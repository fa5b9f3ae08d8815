use axum::{extract::State, http::StatusCode, Json};
use common::healthcheck::HealthCheck;

use crate::control_api_state::Pipelines;

pub async fn get_healthcheck(State(pipelines): State<Pipelines>) -> Json<HealthCheck> {
    let playbook_dir = pipelines.initialize.playbook_dir().display().to_string();
    let result = HealthCheck::new(
        "control-api",
        env!("CARGO_PKG_VERSION"),
        "ok",
        &playbook_dir,
    );

    Json(result)
}

/// CORS preflight for clients which do not send the preflight headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
