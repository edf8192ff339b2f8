use crate::config::EngineConfig;
use crate::engine::{EngineEvent, EngineHandle, LinkStatus, NegotiationEngine};
use crate::error::{ClientError, ClientResult};
use crate::signaling::{SignalSink, SignalingClient};
use crate::transport::{LinkOptions, TransportFactory};
use bytes::Bytes;
use screenlink_core::utils::{MOUSE_MOVE_RATE, MOUSE_SCROLL_RATE, Throttle};
use screenlink_core::{
    ConnectionId, InputKind, InputMessage, JoinRole, JoinSessionResponse, ServerMessage, Signal,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Watching side of a session: a single link toward the host.
pub struct ViewerAgent {
    role: JoinRole,
    engine: EngineHandle,
    events_rx: Option<mpsc::UnboundedReceiver<EngineEvent>>,
    host_id: Option<ConnectionId>,
    peer_id: Option<ConnectionId>,
    /// Set once the session is over; signals are dropped until the next `prepare`.
    left: bool,
    move_throttle: Throttle,
    scroll_throttle: Throttle,
}

impl ViewerAgent {
    pub fn new(
        config: EngineConfig,
        factory: Arc<dyn TransportFactory>,
        signals: Arc<dyn SignalSink>,
        role: JoinRole,
    ) -> Self {
        let (engine, events_rx) =
            NegotiationEngine::spawn(config, LinkOptions::default(), factory, signals);

        Self {
            role,
            engine,
            events_rx: Some(events_rx),
            host_id: None,
            peer_id: None,
            left: false,
            move_throttle: Throttle::new(MOUSE_MOVE_RATE),
            scroll_throttle: Throttle::new(MOUSE_SCROLL_RATE),
        }
    }

    /// Prepares the link, joins through `client` and binds the link to the host.
    /// On a refused join the link is torn down again.
    pub async fn join(
        &mut self,
        client: &SignalingClient,
        session_code: &str,
        pin: Option<String>,
    ) -> ClientResult<JoinSessionResponse> {
        self.prepare()?;

        match client.join_session(session_code, self.role, pin).await {
            Ok(response) => {
                self.joined(&response)?;
                Ok(response)
            }
            Err(e) => {
                warn!("Join failed: {}", e);
                let _ = self.engine.teardown().await;
                Err(e)
            }
        }
    }

    pub fn prepare(&mut self) -> ClientResult<()> {
        self.left = false;
        self.engine.prepare()
    }

    pub fn joined(&mut self, response: &JoinSessionResponse) -> ClientResult<()> {
        self.host_id = Some(response.host_id);
        self.peer_id = Some(response.peer_id);
        self.left = false;
        self.engine.joined(response.host_id)
    }

    pub async fn handle_server_message(&mut self, message: ServerMessage) -> ClientResult<()> {
        match message {
            ServerMessage::Offer(payload) => {
                let Some(sender) = self.from_host(payload.sender_id) else {
                    return Ok(());
                };
                let Signal::Sdp(sdp) = payload.signal else {
                    warn!("Offer without a session description");
                    return Ok(());
                };
                self.engine.handle_offer(sender, sdp.sdp)
            }

            ServerMessage::IceCandidate(payload) => {
                if self.from_host(payload.sender_id).is_none() {
                    return Ok(());
                }
                let Signal::Ice(candidate) = payload.signal else {
                    warn!("ICE message without a candidate");
                    return Ok(());
                };
                self.engine.handle_ice_candidate(candidate)
            }

            ServerMessage::PeerLeft(left) if Some(left.peer_id) == self.host_id => {
                info!("Host left the session");
                self.leave().await
            }

            ServerMessage::SessionExpired => {
                info!("Session expired");
                self.leave().await
            }

            ServerMessage::Error(e) => {
                warn!("Relay error: {} ({})", e.message, e.code.as_str());
                Ok(())
            }

            other => {
                debug!("Ignoring {:?}", other);
                Ok(())
            }
        }
    }

    fn from_host(&self, sender: Option<ConnectionId>) -> Option<ConnectionId> {
        if self.left {
            debug!("Ignoring signal from {:?} after leaving", sender);
            return None;
        }

        match (sender, self.host_id) {
            (Some(sender), Some(host)) if sender == host => Some(sender),
            (Some(sender), None) => Some(sender),
            (sender, _) => {
                warn!("Ignoring signal from {:?}, not the host", sender);
                None
            }
        }
    }

    /// Sends one input event to the host. Returns `Ok(false)` when the event was dropped by
    /// the rate limit; only admins may send input at all.
    pub async fn send_input(&mut self, msg: &InputMessage) -> ClientResult<bool> {
        if self.role != JoinRole::Admin {
            return Err(ClientError::Transport("viewers cannot send input".to_owned()));
        }

        let allowed = match msg.kind {
            InputKind::MouseMove => self.move_throttle.allow(),
            InputKind::MouseScroll => self.scroll_throttle.allow(),
            _ => true,
        };
        if !allowed {
            return Ok(false);
        }

        let bytes = msg.encode().map_err(|e| ClientError::Codec(e.to_string()))?;
        self.engine.send_data(Bytes::from(bytes)).await?;
        Ok(true)
    }

    pub async fn leave(&mut self) -> ClientResult<()> {
        self.host_id = None;
        self.left = true;
        self.engine.teardown().await
    }

    /// Data-channel events; can be taken once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<EngineEvent>> {
        self.events_rx.take()
    }

    pub fn status(&self) -> LinkStatus {
        self.engine.status()
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn host_id(&self) -> Option<ConnectionId> {
        self.host_id
    }

    pub fn peer_id(&self) -> Option<ConnectionId> {
        self.peer_id
    }

    pub fn role(&self) -> JoinRole {
        self.role
    }
}
