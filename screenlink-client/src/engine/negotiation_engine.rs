use crate::config::EngineConfig;
use crate::engine::{ConnectionState, EngineCommand, EngineHandle, LinkStatus};
use crate::error::ClientError;
use crate::signaling::SignalSink;
use crate::transport::{LinkOptions, PeerTransport, TransportEvents, TransportFactory};
use bytes::Bytes;
use screenlink_core::{ConnectionId, IcePayload};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Output of the engine that is not a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    DataChannelOpen,
    Data(Bytes),
}

/// Drives one peer link: turns relayed offers, answers and candidates into calls on a
/// [`PeerTransport`] and folds transport callbacks into a [`ConnectionState`].
///
/// Runs as its own task; see [`NegotiationEngine::spawn`].
pub struct NegotiationEngine {
    pub(super) config: EngineConfig,
    pub(super) options: LinkOptions,
    pub(super) factory: Arc<dyn TransportFactory>,
    pub(super) signals: Arc<dyn SignalSink>,

    pub(super) remote: Option<ConnectionId>,
    pub(super) transport: Option<Arc<dyn PeerTransport>>,
    /// Bumped whenever a transport is created or dropped.
    pub(super) generation: u64,
    pub(super) remote_description_set: bool,
    pub(super) pending_candidates: VecDeque<IcePayload>,
    pub(super) is_initiator: bool,
    pub(super) reconnect_attempts: u32,
    /// Bumped when a reconnect cycle starts or ends, so stale ticks are dropped.
    pub(super) reconnect_epoch: u64,

    status_tx: watch::Sender<LinkStatus>,
    pub(super) events_tx: mpsc::UnboundedSender<EngineEvent>,
    command_rx: mpsc::UnboundedReceiver<EngineCommand>,
    pub(super) command_tx: mpsc::WeakUnboundedSender<EngineCommand>,
}

impl NegotiationEngine {
    pub fn new(
        config: EngineConfig,
        options: LinkOptions,
        factory: Arc<dyn TransportFactory>,
        signals: Arc<dyn SignalSink>,
    ) -> (Self, EngineHandle, mpsc::UnboundedReceiver<EngineEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(LinkStatus::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let engine = Self {
            config,
            options,
            factory,
            signals,
            remote: None,
            transport: None,
            generation: 0,
            remote_description_set: false,
            pending_candidates: VecDeque::new(),
            is_initiator: false,
            reconnect_attempts: 0,
            reconnect_epoch: 0,
            status_tx,
            events_tx,
            command_rx,
            command_tx: command_tx.downgrade(),
        };

        let handle = EngineHandle::new(command_tx, status_rx);
        (engine, handle, events_rx)
    }

    /// Creates the engine and runs it on the current runtime.
    pub fn spawn(
        config: EngineConfig,
        options: LinkOptions,
        factory: Arc<dyn TransportFactory>,
        signals: Arc<dyn SignalSink>,
    ) -> (EngineHandle, mpsc::UnboundedReceiver<EngineEvent>) {
        let (engine, handle, events_rx) = Self::new(config, options, factory, signals);
        tokio::spawn(engine.run());
        (handle, events_rx)
    }

    /// Processes commands until every [`EngineHandle`] is dropped.
    pub async fn run(mut self) {
        debug!("Negotiation engine started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        self.release_transport().await;
        debug!("Negotiation engine finished");
    }

    async fn handle_command(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Prepare => self.prepare().await,
            EngineCommand::Joined { remote } => self.joined(remote).await,
            EngineCommand::Initiate { remote } => self.initiate(remote).await,
            EngineCommand::Offer { sender, sdp } => self.handle_offer(sender, sdp).await,
            EngineCommand::Answer { sdp } => self.handle_answer(sdp).await,
            EngineCommand::Candidate(candidate) => self.handle_ice_candidate(candidate).await,
            EngineCommand::SendData { data, reply } => {
                let _ = reply.send(self.send_data(data).await);
            }
            EngineCommand::Teardown { done } => {
                self.teardown().await;
                let _ = done.send(());
            }
            EngineCommand::Transport { generation, event } => {
                self.handle_transport_event(generation, event).await
            }
            EngineCommand::ReconnectTick { generation, epoch } => {
                self.handle_reconnect_tick(generation, epoch).await
            }
            EngineCommand::HandshakeTimeout { generation } => {
                self.handle_handshake_timeout(generation).await
            }
        }
    }

    pub(super) fn state(&self) -> ConnectionState {
        self.status_tx.borrow().state
    }

    pub(super) fn set_state(&self, state: ConnectionState) {
        self.status_tx.send_if_modified(|status| {
            if status.state == state && status.reason.is_none() {
                return false;
            }
            debug!("Link state {} -> {}", status.state, state);
            *status = LinkStatus::new(state);
            true
        });
    }

    /// Enters the terminal state and drops the transport. No automatic retry follows.
    pub(super) async fn fail(&mut self, reason: &str) {
        warn!("Link failed: {}", reason);
        self.release_transport().await;
        self.status_tx.send_replace(LinkStatus::failed(reason));
    }

    /// Returns the live transport, creating one if needed.
    pub(super) async fn ensure_transport(&mut self) -> anyhow::Result<Arc<dyn PeerTransport>> {
        if let Some(transport) = &self.transport {
            return Ok(transport.clone());
        }

        self.generation += 1;
        let events = TransportEvents::new(self.generation, self.command_tx.clone());
        let transport = self.factory.create(self.options, events).await?;

        self.transport = Some(transport.clone());
        self.remote_description_set = false;
        self.schedule_handshake_timeout();

        Ok(transport)
    }

    /// Closes and forgets the current transport. Callbacks still in flight for it are
    /// ignored from here on.
    pub(super) async fn release_transport(&mut self) {
        let Some(transport) = self.transport.take() else {
            return;
        };

        self.generation += 1;
        self.reconnect_epoch += 1;
        self.reconnect_attempts = 0;
        self.remote_description_set = false;
        self.pending_candidates.clear();

        if let Err(e) = transport.close().await {
            debug!("Error closing transport: {:?}", e);
        }
    }

    async fn prepare(&mut self) {
        if self.state().is_terminal() {
            warn!("Ignoring prepare on a failed link");
            return;
        }

        match self.ensure_transport().await {
            Ok(_) => {
                if self.state() == ConnectionState::Disconnected {
                    self.set_state(ConnectionState::Connecting);
                }
            }
            Err(e) => {
                warn!("Failed to create transport: {:?}", e);
                self.fail("Failed to start connection").await;
            }
        }
    }

    async fn joined(&mut self, remote: ConnectionId) {
        if self.state().is_terminal() {
            return;
        }

        self.remote = Some(remote);
        if self.transport.is_none() {
            self.prepare().await;
        }
        if self.state() == ConnectionState::Connecting {
            self.set_state(ConnectionState::Waiting);
        }
    }

    async fn send_data(&self, data: Bytes) -> Result<(), ClientError> {
        let Some(transport) = &self.transport else {
            return Err(ClientError::Closed);
        };
        transport
            .send_data(data)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    /// Back to `Disconnected` with nothing left over. Safe to call repeatedly.
    pub(super) async fn teardown(&mut self) {
        if self.transport.is_some() {
            info!("Tearing down link to {:?}", self.remote);
        }
        self.release_transport().await;

        self.remote = None;
        self.is_initiator = false;
        self.pending_candidates.clear();
        self.set_state(ConnectionState::Disconnected);
    }

    fn schedule_handshake_timeout(&self) {
        let generation = self.generation;
        let timeout = self.config.handshake_timeout;
        let tx = self.command_tx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(EngineCommand::HandshakeTimeout { generation });
            }
        });
    }

    async fn handle_handshake_timeout(&mut self, generation: u64) {
        if generation != self.generation || !self.state().is_handshaking() {
            return;
        }

        self.fail("Connection timed out").await;
    }
}
