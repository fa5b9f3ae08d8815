use std::io;

use thiserror::Error;

/// A cluster configuration payload could not be decoded or broke one of
/// the configuration invariants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed cluster configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{group} contains a blank host name")]
    BlankHostName { group: &'static str },
    #[error("host '{host}' in {group} has a blank address")]
    BlankHostAddress { group: &'static str, host: String },
    #[error("SSH port must be a positive integer")]
    InvalidSshPort,
    #[error("failed to write config snapshot: {0}")]
    Snapshot(#[from] io::Error),
}

/// The inventory handed to ansible could not be materialized.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("failed to write inventory: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize inventory: {0}")]
    Json(#[from] serde_json::Error),
}

/// An external process could not be spawned or exited unsuccessfully.
///
/// The captured output is kept so the failure can be diagnosed by whoever
/// receives the error, usually the remote client.
#[derive(Error, Debug)]
#[error("command `{command}` failed: {exit_detail}, output: {output}")]
pub struct CommandError {
    pub command: String,
    pub exit_detail: String,
    pub output: String,
}

/// The first failure of a pipeline run, annotated with where it happened.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to generate ansible inventory: {0}")]
    Inventory(#[from] InventoryError),
    #[error("failed to execute {step}: {source}")]
    Step {
        step: String,
        #[source]
        source: CommandError,
    },
}

impl PipelineError {
    /// Name of the step or action that failed, if the failure happened
    /// while running one.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            PipelineError::Inventory(_) => None,
            PipelineError::Step { step, .. } => Some(step),
        }
    }
}
