use async_trait::async_trait;
use screenlink_core::{ConnectionId, IcePayload};

/// Outbound half of signaling as the negotiation engine sees it.
///
/// Delivery is best effort: failures are logged by the implementation, the engine never
/// waits on the relay.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send_offer(&self, target: ConnectionId, sdp: String);

    async fn send_answer(&self, target: ConnectionId, sdp: String);

    async fn send_ice_candidate(&self, target: ConnectionId, candidate: IcePayload);
}
