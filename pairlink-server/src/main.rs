use anyhow::{Context, Result};
use clap::Parser;
use pairlink_core::IceServerConfig;
use pairlink_server::{AppState, RelayConfig, router};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pairlink-server", about = "Signaling relay for pairwise WebRTC calls")]
struct Args {
    /// Address the websocket endpoint listens on.
    #[arg(long, env = "PAIRLINK_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Maximum members per room.
    #[arg(long, env = "PAIRLINK_ROOM_CAPACITY", default_value_t = 2)]
    room_capacity: usize,

    /// STUN server handed to clients; repeat for several.
    #[arg(long = "stun", env = "PAIRLINK_STUN", value_delimiter = ',')]
    stun: Vec<String>,
}

impl Args {
    fn into_config(self) -> RelayConfig {
        let defaults = RelayConfig::default();
        let ice_servers = if self.stun.is_empty() {
            defaults.ice_servers
        } else {
            self.stun.into_iter().map(IceServerConfig::stun).collect()
        };

        RelayConfig {
            bind_addr: self.bind,
            room_capacity: self.room_capacity,
            ice_servers,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();
    info!(
        "Starting relay (room capacity {}, {} ICE servers)",
        config.room_capacity,
        config.ice_servers.len()
    );

    let app = router(AppState::new(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Signaling relay listening on ws://{}/ws", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Relay server stopped")?;
    Ok(())
}
