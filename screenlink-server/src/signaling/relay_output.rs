use async_trait::async_trait;
use screenlink_core::{ConnectionId, ServerMessage};

/// Outbound side of the relay, implemented by whatever owns the sockets.
#[async_trait]
pub trait RelayOutput: Send + Sync {
    /// Deliver a frame. Unknown or already closed connections are skipped.
    async fn send(&self, conn_id: ConnectionId, message: ServerMessage);

    /// Close the connection from the server side.
    async fn close(&self, conn_id: ConnectionId);
}
