//! The `common` crate holds everything needed to bring up a cluster with ansible: the cluster
//! configuration clients send, inventory generation, the [`Pipeline`]s of playbooks and the
//! [`ProgressReporter`] they report through.
//!
//! The HTTP surface lives in the `control-api` crate.
//!
//! [`Pipeline`]: pipeline::Pipeline
//! [`ProgressReporter`]: progress::ProgressReporter

pub mod clap;
pub mod cluster_config;
pub mod command;
mod error;
pub mod healthcheck;
pub mod inventory;
pub mod pipeline;
pub mod progress;
pub mod tracing;

pub use error::{CommandError, ConfigError, InventoryError, PipelineError};
