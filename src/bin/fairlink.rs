//! Bridge runner: replayed (or, through another transport, live) launch
//! monitor on one side, simulator on the other.
//!
//! Usage: fairlink [--config settings.json] [--shots shots.json]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fairlink::analytics::AnalyticsSink;
use fairlink::bridge::Bridge;
use fairlink::config;
use fairlink::device::replay::ReplayTransport;
use fairlink::device::DeviceSupervisor;
use fairlink::gsp::link::{self, SimulatorLink};

#[derive(Parser)]
#[command(name = "fairlink", about = "Bridge a launch monitor to a golf simulator")]
struct Args {
    /// Path to settings.json
    #[arg(long, default_value = "settings.json")]
    config: PathBuf,

    /// Path to the replay script of shots to feed the bridge
    #[arg(long, default_value = "shots.json")]
    shots: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let transport = ReplayTransport::from_file(&args.shots)
        .with_context(|| format!("loading {}", args.shots.display()))?;

    let (inbound_tx, inbound_rx) = mpsc::channel(32);
    let link = SimulatorLink::spawn(link::DEFAULT_ADDR, inbound_tx);

    let (bridge_tx, bridge_rx) = mpsc::channel(32);
    let device = DeviceSupervisor::spawn(
        Arc::new(transport),
        settings.device_settings(),
        bridge_tx,
    );

    let sink = AnalyticsSink::new(
        reqwest::Client::new(),
        settings.api_key.clone(),
        settings.csrf_token.clone(),
    );
    let bridge = Bridge::new(bridge_rx, inbound_rx, link.clone(), sink, device.commands());

    tokio::select! {
        () = bridge.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            link.disconnect_and_stop().await;
        }
    }
    Ok(())
}
