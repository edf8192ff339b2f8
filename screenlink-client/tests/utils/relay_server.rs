use std::time::Duration;

use screenlink_client::{SignalingClient, SignalingClientConfig};
use screenlink_core::ServerMessage;
use screenlink_server::{RelayConfig, router, spawn_relay};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Starts a real relay on an ephemeral localhost port and returns its WebSocket URL.
pub async fn start_relay() -> String {
    let hub = spawn_relay(&RelayConfig::default());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        axum::serve(listener, router(hub))
            .await
            .expect("Test server crashed");
    });

    format!("ws://{}/ws", addr)
}

pub async fn connect(url: &str) -> (SignalingClient, mpsc::UnboundedReceiver<ServerMessage>) {
    let config = SignalingClientConfig {
        url: url.to_owned(),
        join_timeout: Duration::from_secs(2),
    };
    SignalingClient::connect(config)
        .await
        .expect("Failed to connect to relay")
}

pub async fn next_server_message(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for relay event")
        .expect("signaling connection closed")
}
