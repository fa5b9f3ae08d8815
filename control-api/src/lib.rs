use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    control_api_state::ControlApiState,
    controllers::{
        cluster::{post_deploy, post_deploy_progress, post_initialize, post_initialize_progress},
        general::{get_healthcheck, preflight},
    },
};

pub mod cli;
pub mod control_api_state;
pub mod controllers;
pub mod error;
pub mod progress_stream;

pub const DEFAULT_PORT: u16 = 8080;

pub fn router(state: ControlApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        // General
        .route("/healthcheck", get(get_healthcheck))
        // Cluster bring-up
        .route("/api/init", post(post_initialize).options(preflight))
        .route(
            "/api/init/progress",
            post(post_initialize_progress).options(preflight),
        )
        .route("/api/deploy", post(post_deploy).options(preflight))
        .route(
            "/api/deploy/progress",
            post(post_deploy_progress).options(preflight),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
