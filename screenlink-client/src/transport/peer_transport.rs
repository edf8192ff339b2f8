use crate::transport::TransportEvents;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use screenlink_core::{IcePayload, SdpKind};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// Create the `input` data channel locally instead of waiting for the remote one.
    pub open_data_channel: bool,
}

/// One peer-to-peer connection as seen by the negotiation engine.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self, ice_restart: bool) -> Result<String>;

    async fn create_answer(&self) -> Result<String>;

    async fn set_local_description(&self, kind: SdpKind, sdp: String) -> Result<()>;

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IcePayload) -> Result<()>;

    async fn send_data(&self, data: Bytes) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        options: LinkOptions,
        events: TransportEvents,
    ) -> Result<Arc<dyn PeerTransport>>;
}
