use std::path::PathBuf;

use clap::Parser;
use common::clap::PipelineConfig;

use crate::DEFAULT_PORT;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    /// The port the control API listens on
    #[clap(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Write a JSON copy of the last received cluster configuration here
    #[clap(long, env = "CONFIG_SNAPSHOT_PATH")]
    pub config_snapshot_path: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineConfig,
}
