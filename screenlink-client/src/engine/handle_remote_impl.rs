use crate::engine::{ConnectionState, NegotiationEngine};
use screenlink_core::{ConnectionId, IcePayload, SdpKind};
use tracing::{debug, info, warn};

impl NegotiationEngine {
    /// Answering side. Any failure here is final for this link.
    pub(super) async fn handle_offer(&mut self, sender: ConnectionId, sdp: String) {
        if self.state().is_terminal() {
            warn!("Ignoring offer from {} on a failed link", sender);
            return;
        }

        info!("Received offer from {}", sender);
        self.remote = Some(sender);

        let result: anyhow::Result<String> = async {
            let transport = self.ensure_transport().await?;
            transport
                .set_remote_description(SdpKind::Offer, sdp)
                .await?;
            self.remote_description_set = true;
            self.drain_pending_candidates().await;

            let answer = transport.create_answer().await?;
            transport
                .set_local_description(SdpKind::Answer, answer.clone())
                .await?;
            Ok(answer)
        }
        .await;

        match result {
            Ok(answer) => {
                self.signals.send_answer(sender, answer).await;
                if self.state().is_handshaking() || self.state() == ConnectionState::Disconnected {
                    self.set_state(ConnectionState::Waiting);
                }
            }
            Err(e) => {
                warn!("Error handling offer from {}: {:?}", sender, e);
                self.fail("Failed to establish connection").await;
            }
        }
    }

    /// A rejected answer is logged; the link stays where it was.
    pub(super) async fn handle_answer(&mut self, sdp: String) {
        let Some(transport) = self.transport.clone() else {
            warn!("Answer received without a transport");
            return;
        };

        if let Err(e) = transport.set_remote_description(SdpKind::Answer, sdp).await {
            warn!("Error handling answer: {:?}", e);
            return;
        }

        debug!("Remote answer applied");
        self.remote_description_set = true;
        self.drain_pending_candidates().await;
    }

    pub(super) async fn handle_ice_candidate(&mut self, candidate: IcePayload) {
        if self.state().is_terminal() {
            return;
        }

        let transport = match &self.transport {
            Some(transport) if self.remote_description_set => transport.clone(),
            _ => {
                debug!("Queueing early ICE candidate");
                self.pending_candidates.push_back(candidate);
                return;
            }
        };

        if let Err(e) = transport.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate: {:?}", e);
        }
    }

    /// Applies queued candidates in arrival order. One bad candidate does not stop the rest.
    async fn drain_pending_candidates(&mut self) {
        let Some(transport) = self.transport.clone() else {
            return;
        };

        while let Some(candidate) = self.pending_candidates.pop_front() {
            if let Err(e) = transport.add_ice_candidate(candidate).await {
                warn!("Failed to add queued ICE candidate: {:?}", e);
            }
        }
    }
}
