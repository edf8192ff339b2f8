use crate::relay::RelayCommand;
use crate::signaling::RelayOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use screenlink_core::{ConnectionId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

struct HubInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// Open sockets by connection id, plus the command channel into the relay.
#[derive(Clone)]
pub struct ConnectionHub {
    inner: Arc<HubInner>,
    pub(crate) relay_tx: mpsc::Sender<RelayCommand>,
}

impl ConnectionHub {
    pub fn new(relay_tx: mpsc::Sender<RelayCommand>) -> Self {
        Self {
            inner: Arc::new(HubInner {
                connections: DashMap::new(),
            }),
            relay_tx,
        }
    }

    pub fn add_connection(&self, conn_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(conn_id, tx);
    }

    pub fn remove_connection(&self, conn_id: &ConnectionId) {
        self.inner.connections.remove(conn_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn send_message(&self, conn_id: ConnectionId, msg: &ServerMessage) {
        let Some(conn) = self.inner.connections.get(&conn_id) else {
            warn!("Attempted to send to disconnected connection {}", conn_id);
            return;
        };

        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = conn.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", conn_id, e);
                }
            }
            Err(e) => error!("Failed to serialize server message: {}", e),
        }
    }
}

#[async_trait]
impl RelayOutput for ConnectionHub {
    async fn send(&self, conn_id: ConnectionId, message: ServerMessage) {
        self.send_message(conn_id, &message);
    }

    async fn close(&self, conn_id: ConnectionId) {
        let Some((_, conn)) = self.inner.connections.remove(&conn_id) else {
            return;
        };
        debug!("Closing connection {}", conn_id);
        let _ = conn.send(Message::Close(None));
    }
}
