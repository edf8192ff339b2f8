use crate::relay::RelayCommand;
use crate::session::{ExpiryNotice, PeerInfo, PeerRegistry, SessionRegistry};
use crate::signaling::RelayOutput;
use screenlink_core::{
    ClientMessage, ConnectionId, ErrorCode, JoinSessionPayload, JoinSessionResponse,
    PeerJoinedPayload, PeerRole, RegisterHostPayload, RegisterHostResponse, ServerMessage,
    SignalPayload,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Single task that owns both registries. Socket events and session expiries are
/// processed one at a time, in arrival order.
pub struct SignalingRelay {
    sessions: SessionRegistry,
    peers: PeerRegistry,
    command_rx: mpsc::Receiver<RelayCommand>,
    expiry_rx: mpsc::UnboundedReceiver<ExpiryNotice>,
    output: Arc<dyn RelayOutput>,
}

impl SignalingRelay {
    pub fn new(
        sessions: SessionRegistry,
        expiry_rx: mpsc::UnboundedReceiver<ExpiryNotice>,
        peers: PeerRegistry,
        command_rx: mpsc::Receiver<RelayCommand>,
        output: Arc<dyn RelayOutput>,
    ) -> Self {
        Self {
            sessions,
            peers,
            command_rx,
            expiry_rx,
            output,
        }
    }

    /// Relay with fresh, empty registries.
    pub fn with_defaults(
        command_rx: mpsc::Receiver<RelayCommand>,
        output: Arc<dyn RelayOutput>,
    ) -> Self {
        let (sessions, expiry_rx) = SessionRegistry::new();
        Self::new(sessions, expiry_rx, PeerRegistry::new(), command_rx, output)
    }

    pub async fn run(mut self) {
        info!("Signaling relay started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down relay.");
                            break;
                        }
                    }
                }

                Some(notice) = self.expiry_rx.recv() => {
                    self.handle_expiry(notice).await;
                }
            }
        }

        info!("Signaling relay finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Message { conn_id, message } => {
                if let Err(code) = message.validate() {
                    warn!("Rejecting {} from {}: {}", message.name(), conn_id, code);
                    self.output.send(conn_id, ServerMessage::error(code)).await;
                    return;
                }

                match message {
                    ClientMessage::RegisterHost(payload) => {
                        self.handle_register_host(conn_id, payload).await
                    }
                    ClientMessage::JoinSession(payload) => {
                        self.handle_join_session(conn_id, payload).await
                    }
                    ClientMessage::Offer(payload) => {
                        self.forward(conn_id, payload, ServerMessage::Offer).await
                    }
                    ClientMessage::Answer(payload) => {
                        self.forward(conn_id, payload, ServerMessage::Answer).await
                    }
                    ClientMessage::IceCandidate(payload) => {
                        self.forward(conn_id, payload, ServerMessage::IceCandidate)
                            .await
                    }
                }
            }

            RelayCommand::Disconnected { conn_id } => {
                debug!("Connection {} closed", conn_id);
                self.detach(conn_id).await;
            }
        }
    }

    async fn handle_register_host(&mut self, conn_id: ConnectionId, payload: RegisterHostPayload) {
        self.leave_previous_session(conn_id).await;

        let ttl = payload.expires_in_ms.map(Duration::from_millis);
        let session = self.sessions.create_session(conn_id, ttl, payload.pin);

        self.peers.add_peer(PeerInfo {
            connection_id: conn_id,
            role: PeerRole::Host,
            session_code: session.code.clone(),
        });

        let response = RegisterHostResponse {
            session_code: session.code,
            host_id: conn_id,
        };
        self.output
            .send(conn_id, ServerMessage::RegisterHostResponse(response))
            .await;
    }

    async fn handle_join_session(&mut self, conn_id: ConnectionId, payload: JoinSessionPayload) {
        let checked = self.sessions.check_join(
            &payload.session_code,
            conn_id,
            payload.role,
            payload.pin.as_deref(),
        );
        let code = match checked {
            Ok(code) => code,
            Err(code) => {
                info!("Join failed for {}: {}", conn_id, code.as_str());
                self.output.send(conn_id, ServerMessage::error(code)).await;
                return;
            }
        };

        let hosts_target = self
            .peers
            .get_peer(&conn_id)
            .is_some_and(|peer| peer.role == PeerRole::Host && peer.session_code == code);
        if hosts_target {
            warn!("Host {} tried to join its own session {}", conn_id, code);
            self.output
                .send(conn_id, ServerMessage::error(ErrorCode::InvalidMessage))
                .await;
            return;
        }

        self.leave_previous_session(conn_id).await;

        let result = self
            .sessions
            .join_session(&code, conn_id, payload.role, payload.pin.as_deref());

        let session = match result {
            Ok(session) => session,
            Err(code) => {
                info!("Join failed for {}: {}", conn_id, code.as_str());
                self.output.send(conn_id, ServerMessage::error(code)).await;
                return;
            }
        };

        let role = PeerRole::from(payload.role);
        self.peers.add_peer(PeerInfo {
            connection_id: conn_id,
            role,
            session_code: session.code.clone(),
        });

        let response = JoinSessionResponse {
            host_id: session.host_id,
            peer_id: conn_id,
            viewers: session.viewer_ids.clone(),
        };
        self.output
            .send(conn_id, ServerMessage::JoinSessionResponse(response))
            .await;

        let joined = PeerJoinedPayload {
            peer_id: conn_id,
            role,
        };
        self.output
            .send(session.host_id, ServerMessage::PeerJoined(joined))
            .await;
    }

    async fn forward(
        &self,
        sender: ConnectionId,
        mut payload: SignalPayload,
        wrap: fn(SignalPayload) -> ServerMessage,
    ) {
        payload.sender_id = Some(sender);
        let target = payload.target_id;
        let message = wrap(payload);

        debug!("Relaying {} from {} to {}", message_kind(&message), sender, target);
        self.output.send(target, message).await;
    }

    /// A connection that registers or joins again first leaves the session it was bound to.
    async fn leave_previous_session(&mut self, conn_id: ConnectionId) {
        if self.peers.get_peer(&conn_id).is_some() {
            info!("Connection {} rebinding, leaving its previous session", conn_id);
            self.detach(conn_id).await;
        }
    }

    async fn detach(&mut self, conn_id: ConnectionId) {
        let Some(peer) = self.peers.remove_peer(&conn_id) else {
            return;
        };
        let Some(removal) = self.sessions.remove_peer_from_session(&conn_id) else {
            return;
        };

        if removal.was_host {
            let code = removal.session.code;
            info!("Host {} left, removing session {}", conn_id, code);

            for remaining in self.peers.get_peers_by_session(&code) {
                self.output
                    .send(remaining.connection_id, ServerMessage::peer_left(conn_id))
                    .await;
                self.peers.remove_peer(&remaining.connection_id);
            }
            self.sessions.remove_session(&code);
        } else {
            info!("{} {} left session {}", peer.role, conn_id, peer.session_code);
            self.output
                .send(removal.session.host_id, ServerMessage::peer_left(conn_id))
                .await;
        }
    }

    async fn handle_expiry(&mut self, notice: ExpiryNotice) {
        let Some(session) = self.sessions.take_expired(&notice) else {
            return;
        };

        let mut members: Vec<ConnectionId> = self
            .peers
            .get_peers_by_session(&session.code)
            .into_iter()
            .map(|peer| peer.connection_id)
            .collect();
        if !members.contains(&session.host_id) {
            members.push(session.host_id);
        }

        for conn_id in members {
            self.output.send(conn_id, ServerMessage::SessionExpired).await;
            self.output.close(conn_id).await;
            self.peers.remove_peer(&conn_id);
        }
    }
}

fn message_kind(message: &ServerMessage) -> &'static str {
    match message {
        ServerMessage::Offer(_) => "offer",
        ServerMessage::Answer(_) => "answer",
        ServerMessage::IceCandidate(_) => "ice-candidate",
        _ => "message",
    }
}
