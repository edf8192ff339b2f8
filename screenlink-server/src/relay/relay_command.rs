use screenlink_core::{ClientMessage, ConnectionId};

/// Events delivered to the relay by the socket layer.
#[derive(Debug)]
pub enum RelayCommand {
    /// A decoded frame from one connection.
    Message {
        conn_id: ConnectionId,
        message: ClientMessage,
    },

    /// The socket is gone, whichever side closed it.
    Disconnected { conn_id: ConnectionId },
}
