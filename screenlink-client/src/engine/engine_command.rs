use crate::error::ClientResult;
use crate::transport::TransportEvent;
use bytes::Bytes;
use screenlink_core::{ConnectionId, IcePayload};
use tokio::sync::oneshot;

/// Everything the engine reacts to, serialized through one queue.
pub enum EngineCommand {
    /// Create the transport ahead of joining a session.
    Prepare,
    /// Join confirmed; `remote` is the peer that will send the offer.
    Joined { remote: ConnectionId },
    /// Start negotiation toward `remote` as the offering side.
    Initiate { remote: ConnectionId },
    Offer { sender: ConnectionId, sdp: String },
    Answer { sdp: String },
    Candidate(IcePayload),
    SendData {
        data: Bytes,
        reply: oneshot::Sender<ClientResult<()>>,
    },
    Teardown { done: oneshot::Sender<()> },
    Transport { generation: u64, event: TransportEvent },
    ReconnectTick { generation: u64, epoch: u64 },
    HandshakeTimeout { generation: u64 },
}
