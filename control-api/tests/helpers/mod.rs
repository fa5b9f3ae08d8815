use std::{path::PathBuf, sync::Arc};

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use common::{
    clap::PipelineConfig,
    command::testing::FakeCommandRunner,
    progress::{ProgressKind, ProgressMessage},
};
use control_api::{control_api_state::ControlApiState, router};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const CLUSTER_JSON: &str = r#"{
    "masters": {"m1": "10.0.0.1"},
    "nodes": {"n1": "10.0.0.2"},
    "sshUser": "root",
    "sshPort": 22
}"#;

pub fn app(runner: Arc<FakeCommandRunner>, config_snapshot_path: Option<PathBuf>) -> Router {
    let state = ControlApiState::new(&PipelineConfig::for_tests(), runner, config_snapshot_path);

    router(state)
}

pub async fn post(app: Router, uri: &str, body: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// Reads the whole event stream, which ends once the pipeline has finished.
pub async fn progress_events(response: Response<Body>) -> Vec<ProgressMessage> {
    body_string(response)
        .await
        .split("\n\n")
        .filter_map(|event| event.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

pub fn terminal_events(events: &[ProgressMessage]) -> Vec<&ProgressMessage> {
    events
        .iter()
        .filter(|event| event.kind != ProgressKind::Progress)
        .collect()
}
