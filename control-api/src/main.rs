use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use clap::Parser;
use common::{
    command::{CommandRunner, ShellCommandRunner},
    tracing::init_tracing,
};
use control_api::{cli::Cli, control_api_state::ControlApiState, router};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _ = start(cli).await.map_err(|e| {
        tracing::error!("{}", e);
    });
}

async fn start(cli: Cli) -> anyhow::Result<()> {
    init_tracing("info");

    tracing::info!("Cli args: {cli:?}");

    let runner: Arc<dyn CommandRunner> =
        Arc::new(ShellCommandRunner::new(cli.pipeline.settle_delay()));

    let control_api_state = ControlApiState::new(&cli.pipeline, runner, cli.config_snapshot_path);

    let app = router(control_api_state);

    let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), cli.port);

    tracing::info!("Starting control API server on http://{:?}", socket_addr);
    let listener = TcpListener::bind(&socket_addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
