use crate::engine::{ConnectionState, EngineCommand, LinkStatus};
use crate::error::{ClientError, ClientResult};
use bytes::Bytes;
use screenlink_core::{ConnectionId, IcePayload};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

/// Cheap, cloneable front for a running [`NegotiationEngine`](crate::engine::NegotiationEngine).
///
/// Commands are queued and handled in order; the call returns as soon as the command is queued.
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::UnboundedSender<EngineCommand>,
    status_rx: watch::Receiver<LinkStatus>,
}

impl EngineHandle {
    pub(crate) fn new(
        command_tx: mpsc::UnboundedSender<EngineCommand>,
        status_rx: watch::Receiver<LinkStatus>,
    ) -> Self {
        Self {
            command_tx,
            status_rx,
        }
    }

    fn send(&self, cmd: EngineCommand) -> ClientResult<()> {
        self.command_tx.send(cmd).map_err(|_| ClientError::Closed)
    }

    /// Creates the transport before the join completes, so the answering side is ready
    /// for an early offer.
    pub fn prepare(&self) -> ClientResult<()> {
        self.send(EngineCommand::Prepare)
    }

    pub fn joined(&self, remote: ConnectionId) -> ClientResult<()> {
        self.send(EngineCommand::Joined { remote })
    }

    pub fn initiate(&self, remote: ConnectionId) -> ClientResult<()> {
        self.send(EngineCommand::Initiate { remote })
    }

    pub fn handle_offer(&self, sender: ConnectionId, sdp: String) -> ClientResult<()> {
        self.send(EngineCommand::Offer { sender, sdp })
    }

    pub fn handle_answer(&self, sdp: String) -> ClientResult<()> {
        self.send(EngineCommand::Answer { sdp })
    }

    pub fn handle_ice_candidate(&self, candidate: IcePayload) -> ClientResult<()> {
        self.send(EngineCommand::Candidate(candidate))
    }

    pub async fn send_data(&self, data: Bytes) -> ClientResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::SendData { data, reply })?;
        rx.await.map_err(|_| ClientError::Closed)?
    }

    /// Resolves once the engine is back in `Disconnected`.
    pub async fn teardown(&self) -> ClientResult<()> {
        let (done, rx) = oneshot::channel();
        self.send(EngineCommand::Teardown { done })?;
        rx.await.map_err(|_| ClientError::Closed)
    }

    pub fn status(&self) -> LinkStatus {
        self.status_rx.borrow().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.status_rx.borrow().state
    }

    pub fn subscribe(&self) -> watch::Receiver<LinkStatus> {
        self.status_rx.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Waits until the link reaches `state`.
    pub async fn wait_for(&self, state: ConnectionState, timeout: Duration) -> ClientResult<()> {
        let mut rx = self.status_rx.clone();
        tokio::time::timeout(timeout, rx.wait_for(|status| status.state == state))
            .await
            .map_err(|_| ClientError::Timeout("link state"))?
            .map_err(|_| ClientError::Closed)?;
        Ok(())
    }
}
