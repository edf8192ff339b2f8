use crate::relay::{RelayCommand, SignalingRelay};
use crate::signaling::{ConnectionHub, router};
use anyhow::{Context, Result};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    /// Capacity of the socket → relay command channel.
    pub command_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            command_buffer: 256,
        }
    }
}

/// Starts the relay task and returns the hub that feeds it.
pub fn spawn_relay(config: &RelayConfig) -> ConnectionHub {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RelayCommand>(config.command_buffer);
    let hub = ConnectionHub::new(cmd_tx);

    let relay = SignalingRelay::with_defaults(cmd_rx, Arc::new(hub.clone()));
    tokio::spawn(relay.run());

    hub
}

pub async fn serve(config: RelayConfig) -> Result<()> {
    let hub = spawn_relay(&config);
    let app = router(hub);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Signaling server listening on http://{}", config.bind);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
