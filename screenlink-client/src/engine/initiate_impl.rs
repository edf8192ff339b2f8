use crate::engine::{ConnectionState, NegotiationEngine};
use screenlink_core::{ConnectionId, SdpKind};
use tracing::{info, warn};

impl NegotiationEngine {
    /// Offering side: fresh transport, local offer, relay it to `remote`.
    pub(super) async fn initiate(&mut self, remote: ConnectionId) {
        if self.state().is_terminal() {
            warn!("Ignoring initiate toward {} on a failed link", remote);
            return;
        }

        self.release_transport().await;
        self.remote = Some(remote);
        self.is_initiator = true;

        let transport = match self.ensure_transport().await {
            Ok(transport) => transport,
            Err(e) => {
                warn!("Failed to create transport for {}: {:?}", remote, e);
                self.fail("Failed to start connection").await;
                return;
            }
        };
        self.set_state(ConnectionState::Connecting);

        let offer = match transport.create_offer(false).await {
            Ok(sdp) => sdp,
            Err(e) => {
                warn!("Failed to create offer for {}: {:?}", remote, e);
                self.fail("Failed to start connection").await;
                return;
            }
        };

        if let Err(e) = transport
            .set_local_description(SdpKind::Offer, offer.clone())
            .await
        {
            warn!("Failed to apply local offer for {}: {:?}", remote, e);
            self.fail("Failed to start connection").await;
            return;
        }

        info!("Sending offer to {}", remote);
        self.signals.send_offer(remote, offer).await;
        self.set_state(ConnectionState::Waiting);
    }

    /// Initiator side of a reconnect attempt: renegotiate with an ICE restart.
    pub(super) async fn restart_ice(&mut self) {
        let (Some(transport), Some(remote)) = (self.transport.clone(), self.remote) else {
            return;
        };

        let offer = match transport.create_offer(true).await {
            Ok(sdp) => sdp,
            Err(e) => {
                warn!("ICE restart offer failed for {}: {:?}", remote, e);
                return;
            }
        };

        if let Err(e) = transport
            .set_local_description(SdpKind::Offer, offer.clone())
            .await
        {
            warn!("Failed to apply ICE restart offer for {}: {:?}", remote, e);
            return;
        }

        self.remote_description_set = false;
        self.signals.send_offer(remote, offer).await;
    }
}
