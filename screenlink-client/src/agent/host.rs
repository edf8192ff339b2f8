use crate::config::EngineConfig;
use crate::engine::{ConnectionState, EngineEvent, EngineHandle, NegotiationEngine};
use crate::input::InputDispatcher;
use crate::signaling::SignalSink;
use crate::transport::{LinkOptions, TransportFactory};
use screenlink_core::{ConnectionId, InputMessage, PeerRole, ServerMessage, Signal, SignalPayload};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct HostPeer {
    role: PeerRole,
    engine: EngineHandle,
    forwarder: JoinHandle<()>,
}

/// Sharing side of a session: one negotiation engine per joined peer, keyed by the
/// peer's connection id.
pub struct HostAgent {
    config: EngineConfig,
    factory: Arc<dyn TransportFactory>,
    signals: Arc<dyn SignalSink>,
    dispatcher: Option<InputDispatcher>,
    peers: HashMap<ConnectionId, HostPeer>,
    expired: bool,
}

impl HostAgent {
    /// `dispatcher` is `None` when remote control is unavailable on this machine; admin
    /// input is then received and dropped.
    pub fn new(
        config: EngineConfig,
        factory: Arc<dyn TransportFactory>,
        signals: Arc<dyn SignalSink>,
        dispatcher: Option<InputDispatcher>,
    ) -> Self {
        Self {
            config,
            factory,
            signals,
            dispatcher,
            peers: HashMap::new(),
            expired: false,
        }
    }

    /// Handles relay events until the session expires or the signaling connection ends,
    /// then tears every link down.
    pub async fn run(mut self, mut server_rx: mpsc::UnboundedReceiver<ServerMessage>) {
        while let Some(message) = server_rx.recv().await {
            self.handle_server_message(message).await;
            if self.expired {
                break;
            }
        }

        self.shutdown().await;
        info!("Host agent finished");
    }

    pub async fn handle_server_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::PeerJoined(joined) => self.add_peer(joined.peer_id, joined.role).await,
            ServerMessage::PeerLeft(left) => self.remove_peer(&left.peer_id).await,
            ServerMessage::Answer(payload) => self.route_answer(payload),
            ServerMessage::IceCandidate(payload) => self.route_candidate(payload),
            ServerMessage::Offer(payload) => {
                warn!("Host received an offer from {:?}, ignoring", payload.sender_id);
            }
            ServerMessage::SessionExpired => {
                info!("Session expired");
                self.expired = true;
                self.shutdown().await;
            }
            ServerMessage::Error(e) => warn!("Relay error: {} ({})", e.message, e.code.as_str()),
            ServerMessage::RegisterHostResponse(_) | ServerMessage::JoinSessionResponse(_) => {
                debug!("Ignoring unsolicited response");
            }
        }
    }

    async fn add_peer(&mut self, peer_id: ConnectionId, role: PeerRole) {
        if let Some(previous) = self.peers.remove(&peer_id) {
            warn!("Peer {} joined twice, replacing its link", peer_id);
            Self::drop_peer(previous).await;
        }

        let options = LinkOptions {
            open_data_channel: role.can_control(),
        };
        let (engine, events_rx) = NegotiationEngine::spawn(
            self.config.clone(),
            options,
            self.factory.clone(),
            self.signals.clone(),
        );

        let dispatcher = self.dispatcher.clone().filter(|_| role.can_control());
        let forwarder = tokio::spawn(forward_input(peer_id, events_rx, dispatcher));

        info!("{} {} joined, sending offer", role, peer_id);
        if let Err(e) = engine.initiate(peer_id) {
            warn!("Engine for {} is gone: {}", peer_id, e);
        }

        self.peers.insert(
            peer_id,
            HostPeer {
                role,
                engine,
                forwarder,
            },
        );
    }

    async fn remove_peer(&mut self, peer_id: &ConnectionId) {
        match self.peers.remove(peer_id) {
            Some(peer) => {
                info!("{} {} left", peer.role, peer_id);
                Self::drop_peer(peer).await;
            }
            None => debug!("peer-left for unknown peer {}", peer_id),
        }
    }

    async fn drop_peer(peer: HostPeer) {
        let _ = peer.engine.teardown().await;
        peer.forwarder.abort();
    }

    fn engine_for(&self, payload: &SignalPayload) -> Option<&EngineHandle> {
        let sender = payload.sender_id?;
        let peer = self.peers.get(&sender);
        if peer.is_none() {
            warn!("Signal from unknown peer {}", sender);
        }
        peer.map(|p| &p.engine)
    }

    fn route_answer(&self, payload: SignalPayload) {
        let Some(engine) = self.engine_for(&payload) else {
            return;
        };
        let Signal::Sdp(sdp) = payload.signal else {
            warn!("Answer without a session description");
            return;
        };
        let _ = engine.handle_answer(sdp.sdp);
    }

    fn route_candidate(&self, payload: SignalPayload) {
        let Some(engine) = self.engine_for(&payload) else {
            return;
        };
        let Signal::Ice(candidate) = payload.signal else {
            warn!("ICE message without a candidate");
            return;
        };
        let _ = engine.handle_ice_candidate(candidate);
    }

    /// Tears down every peer link.
    pub async fn shutdown(&mut self) {
        for (_, peer) in self.peers.drain() {
            Self::drop_peer(peer).await;
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn peer_state(&self, peer_id: &ConnectionId) -> Option<ConnectionState> {
        self.peers.get(peer_id).map(|p| p.engine.state())
    }

    pub fn peer_engine(&self, peer_id: &ConnectionId) -> Option<EngineHandle> {
        self.peers.get(peer_id).map(|p| p.engine.clone())
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

/// Decodes data-channel frames from one peer and applies them. Frames from peers without
/// control rights never reach the dispatcher.
async fn forward_input(
    peer_id: ConnectionId,
    mut events_rx: mpsc::UnboundedReceiver<EngineEvent>,
    dispatcher: Option<InputDispatcher>,
) {
    while let Some(event) = events_rx.recv().await {
        match event {
            EngineEvent::DataChannelOpen => info!("Input channel open for {}", peer_id),
            EngineEvent::Data(bytes) => {
                let Some(dispatcher) = &dispatcher else {
                    warn!("Dropping input from {}: no control rights", peer_id);
                    continue;
                };
                match InputMessage::decode(&bytes) {
                    Ok(msg) => dispatcher.dispatch(&msg),
                    Err(e) => warn!("Malformed input from {}: {}", peer_id, e),
                }
            }
        }
    }
}
