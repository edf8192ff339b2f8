use crate::engine::{ConnectionState, EngineCommand, EngineEvent, NegotiationEngine};
use crate::transport::{TransportEvent, TransportState};
use tracing::{debug, info, warn};

impl NegotiationEngine {
    pub(super) async fn handle_transport_event(&mut self, generation: u64, event: TransportEvent) {
        if generation != self.generation {
            debug!("Dropping event from stale transport (gen {})", generation);
            return;
        }
        if self.state().is_terminal() {
            return;
        }

        match event {
            TransportEvent::StateChanged(state) => self.on_transport_state(state).await,

            TransportEvent::CandidateGenerated(candidate) => {
                let Some(remote) = self.remote else {
                    warn!("Local ICE candidate with no remote peer, dropping");
                    return;
                };
                self.signals.send_ice_candidate(remote, candidate).await;
            }

            TransportEvent::DataChannelOpen => {
                let _ = self.events_tx.send(EngineEvent::DataChannelOpen);
            }

            TransportEvent::Message(bytes) => {
                let _ = self.events_tx.send(EngineEvent::Data(bytes));
            }
        }
    }

    async fn on_transport_state(&mut self, state: TransportState) {
        match state {
            TransportState::Connected => {
                if self.state() == ConnectionState::Reconnecting {
                    info!("Link recovered after {} attempt(s)", self.reconnect_attempts);
                }
                self.reconnect_attempts = 0;
                self.reconnect_epoch += 1;
                self.set_state(ConnectionState::Connected);
            }

            TransportState::Disconnected => {
                if self.state() != ConnectionState::Reconnecting {
                    info!("Link interrupted, trying to recover");
                    self.reconnect_attempts = 0;
                    self.reconnect_epoch += 1;
                    self.set_state(ConnectionState::Reconnecting);
                    self.schedule_reconnect_tick();
                }
            }

            TransportState::Failed => self.fail("Connection lost").await,

            TransportState::Closed => {
                info!("Transport closed by the remote side");
                self.teardown().await;
            }

            TransportState::New | TransportState::Connecting => {}
        }
    }

    pub(super) async fn handle_reconnect_tick(&mut self, generation: u64, epoch: u64) {
        if generation != self.generation
            || epoch != self.reconnect_epoch
            || self.state() != ConnectionState::Reconnecting
        {
            return;
        }

        self.reconnect_attempts += 1;
        if self.reconnect_attempts > self.config.reconnect.max_attempts {
            self.fail("Connection lost").await;
            return;
        }

        debug!(
            "Reconnect attempt {}/{}",
            self.reconnect_attempts, self.config.reconnect.max_attempts
        );
        if self.is_initiator {
            self.restart_ice().await;
        }
        self.schedule_reconnect_tick();
    }

    fn schedule_reconnect_tick(&self) {
        let generation = self.generation;
        let epoch = self.reconnect_epoch;
        let delay = self.config.reconnect.delay;
        let tx = self.command_tx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(EngineCommand::ReconnectTick { generation, epoch });
            }
        });
    }
}
