use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use common::{
    cluster_config::ClusterConfig, pipeline::Pipeline, progress::LoggingProgressReporter,
};
use serde::{Deserialize, Serialize};
use tokio_stream::Stream;

use crate::{
    control_api_state::{ConfigSnapshot, Pipelines},
    error::AppError,
    progress_stream::{into_event_stream, StreamingProgressReporter},
};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineResponse {
    pub message: String,
    pub code: u16,
}

pub async fn post_initialize(
    State(pipelines): State<Pipelines>,
    State(config_snapshot): State<ConfigSnapshot>,
    body: Bytes,
) -> Result<Json<PipelineResponse>, AppError> {
    run_to_completion(pipelines.initialize, config_snapshot, &body).await
}

pub async fn post_deploy(
    State(pipelines): State<Pipelines>,
    State(config_snapshot): State<ConfigSnapshot>,
    body: Bytes,
) -> Result<Json<PipelineResponse>, AppError> {
    run_to_completion(pipelines.deploy, config_snapshot, &body).await
}

pub async fn post_initialize_progress(
    State(pipelines): State<Pipelines>,
    State(config_snapshot): State<ConfigSnapshot>,
    body: Bytes,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    run_with_progress(pipelines.initialize, config_snapshot, &body)
}

pub async fn post_deploy_progress(
    State(pipelines): State<Pipelines>,
    State(config_snapshot): State<ConfigSnapshot>,
    body: Bytes,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    run_with_progress(pipelines.deploy, config_snapshot, &body)
}

async fn run_to_completion(
    pipeline: Arc<Pipeline>,
    config_snapshot: ConfigSnapshot,
    body: &[u8],
) -> Result<Json<PipelineResponse>, AppError> {
    // A body we cannot read means the pipeline never starts
    let config = ClusterConfig::decode(body)?;
    tracing::info!("Decoded cluster config: {:?}", config);

    let kind = pipeline.kind();

    tokio::task::spawn_blocking(move || {
        config_snapshot.save(&config);
        pipeline.run(&config, &mut LoggingProgressReporter)
    })
    .await?
    .map_err(|source| AppError::Pipeline { kind, source })?;

    Ok(Json(PipelineResponse {
        message: kind.completed_message().to_string(),
        code: 200,
    }))
}

fn run_with_progress(
    pipeline: Arc<Pipeline>,
    config_snapshot: ConfigSnapshot,
    body: &[u8],
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    // Only a config the client actually sent replaces the snapshot
    let received = ClusterConfig::decode(body)
        .inspect_err(|e| tracing::warn!("Failed to decode cluster config, using defaults: {}", e))
        .ok();

    let (mut reporter, receiver) = StreamingProgressReporter::new(pipeline.total_steps());

    // Not awaited, the stream ends when the reporter is dropped
    tokio::task::spawn_blocking(move || {
        let config = match received {
            Some(config) => {
                tracing::info!("Decoded cluster config: {:?}", config);
                config_snapshot.save(&config);
                config
            }
            None => ClusterConfig::default(),
        };

        let kind = pipeline.kind();
        match pipeline.run(&config, &mut reporter) {
            Ok(()) => reporter.complete(kind.completed_message()),
            Err(e) => {
                tracing::error!("Cluster {} failed: {}", kind, e);
                reporter.fail(&kind.failed_message(&e));
            }
        }
    });

    Sse::new(into_event_stream(receiver))
}
