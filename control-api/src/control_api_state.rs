use std::{path::PathBuf, sync::Arc};

use axum::extract::FromRef;
use common::{
    clap::PipelineConfig, cluster_config::ClusterConfig, command::CommandRunner,
    pipeline::Pipeline,
};

#[derive(Clone)]
pub struct Pipelines {
    pub initialize: Arc<Pipeline>,
    pub deploy: Arc<Pipeline>,
}

/// Where the last received cluster configuration is written, if anywhere.
#[derive(Clone, Default)]
pub struct ConfigSnapshot(Option<Arc<PathBuf>>);

impl ConfigSnapshot {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self(path.map(Arc::new))
    }

    /// Blocking. A failed write is logged and otherwise ignored.
    pub fn save(&self, config: &ClusterConfig) {
        let Some(path) = &self.0 else {
            return;
        };

        match config.save_snapshot(path.as_path()) {
            Ok(()) => tracing::debug!("Cluster config saved to {}", path.display()),
            Err(e) => tracing::warn!("Failed to save cluster config snapshot: {}", e),
        }
    }
}

#[derive(Clone, FromRef)]
pub struct ControlApiState {
    pub pipelines: Pipelines,
    pub config_snapshot: ConfigSnapshot,
}

impl ControlApiState {
    pub fn new(
        config: &PipelineConfig,
        runner: Arc<dyn CommandRunner>,
        config_snapshot_path: Option<PathBuf>,
    ) -> Self {
        let pipelines = Pipelines {
            initialize: Arc::new(Pipeline::initialize(config, runner.clone())),
            deploy: Arc::new(Pipeline::deploy(config, runner)),
        };

        Self {
            pipelines,
            config_snapshot: ConfigSnapshot::new(config_snapshot_path),
        }
    }
}
