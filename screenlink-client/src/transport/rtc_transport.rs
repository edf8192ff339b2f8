use crate::config::EngineConfig;
use crate::transport::{
    LinkOptions, PeerTransport, TransportEvent, TransportEvents, TransportFactory, TransportState,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use screenlink_core::utils::INPUT_DATA_CHANNEL;
use screenlink_core::{IcePayload, IceServerConfig, SdpKind};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_local::TrackLocal;

type DataChannelSlot = Arc<Mutex<Option<Arc<RTCDataChannel>>>>;

/// Builds `webrtc` peer connections. Local tracks (the captured screen) are attached to every
/// connection it creates.
#[derive(Clone)]
pub struct RtcTransportFactory {
    ice_servers: Vec<RTCIceServer>,
    tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl RtcTransportFactory {
    pub fn new(ice_servers: &[IceServerConfig]) -> Self {
        let ice_servers = ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            ice_servers,
            tracks: Vec::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.ice_servers)
    }

    pub fn with_track(mut self, track: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        self.tracks.push(track);
        self
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        options: LinkOptions,
        events: TransportEvents,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = RtcTransport::new(&self.ice_servers, &self.tracks, options, events).await?;
        Ok(Arc::new(transport))
    }
}

pub struct RtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: DataChannelSlot,
}

impl RtcTransport {
    pub async fn new(
        ice_servers: &[RTCIceServer],
        tracks: &[Arc<dyn TrackLocal + Send + Sync>],
        options: LinkOptions,
        events: TransportEvents,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers.to_vec(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        for track in tracks {
            peer_connection
                .add_track(Arc::clone(track))
                .await
                .context("Failed to attach local track")?;
        }

        let generation = events.generation();

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();

                Box::pin(async move {
                    info!("Peer connection state (gen {}): {:?}", generation, s);
                    let state = match s {
                        RTCPeerConnectionState::New | RTCPeerConnectionState::Unspecified => {
                            TransportState::New
                        }
                        RTCPeerConnectionState::Connecting => TransportState::Connecting,
                        RTCPeerConnectionState::Connected => TransportState::Connected,
                        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
                        RTCPeerConnectionState::Failed => TransportState::Failed,
                        RTCPeerConnectionState::Closed => TransportState::Closed,
                    };
                    events.emit(TransportEvent::StateChanged(state));
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Failed to serialize local ICE candidate: {}", e);
                        return;
                    }
                };
                events.emit(TransportEvent::CandidateGenerated(IcePayload {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                }));
            })
        }));

        let data_channel: DataChannelSlot = Arc::new(Mutex::new(None));

        if options.open_data_channel {
            let channel = peer_connection
                .create_data_channel(INPUT_DATA_CHANNEL, None)
                .await
                .context("Failed to create input data channel")?;
            wire_data_channel(&channel, &events, &data_channel);
        } else {
            let dc_events = events.clone();
            let dc_slot = data_channel.clone();
            peer_connection.on_data_channel(Box::new(move |channel: Arc<RTCDataChannel>| {
                let events = dc_events.clone();
                let slot = dc_slot.clone();

                Box::pin(async move {
                    debug!("Remote opened data channel '{}'", channel.label());
                    wire_data_channel(&channel, &events, &slot);
                })
            }));
        }

        Ok(Self {
            peer_connection,
            data_channel,
        })
    }

    fn current_channel(&self) -> Option<Arc<RTCDataChannel>> {
        self.data_channel
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().cloned())
    }
}

fn wire_data_channel(
    channel: &Arc<RTCDataChannel>,
    events: &TransportEvents,
    slot: &DataChannelSlot,
) {
    if let Ok(mut slot) = slot.lock() {
        *slot = Some(channel.clone());
    }

    let open_events = events.clone();
    let label = channel.label().to_owned();
    channel.on_open(Box::new(move || {
        let events = open_events.clone();
        let label = label.clone();

        Box::pin(async move {
            info!("Data channel '{}' open", label);
            events.emit(TransportEvent::DataChannelOpen);
        })
    }));

    let msg_events = events.clone();
    channel.on_message(Box::new(move |msg: DataChannelMessage| {
        let events = msg_events.clone();

        Box::pin(async move {
            events.emit(TransportEvent::Message(msg.data));
        })
    }));
}

fn description(kind: SdpKind, sdp: String) -> Result<RTCSessionDescription> {
    let desc = match kind {
        SdpKind::Offer => RTCSessionDescription::offer(sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(sdp)?,
    };
    Ok(desc)
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self, ice_restart: bool) -> Result<String> {
        let options = ice_restart.then(|| RTCOfferOptions {
            ice_restart: true,
            ..Default::default()
        });
        let offer = self.peer_connection.create_offer(options).await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(answer.sdp)
    }

    async fn set_local_description(&self, kind: SdpKind, sdp: String) -> Result<()> {
        self.peer_connection
            .set_local_description(description(kind, sdp)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()> {
        self.peer_connection
            .set_remote_description(description(kind, sdp)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IcePayload) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn send_data(&self, data: Bytes) -> Result<()> {
        let channel = self
            .current_channel()
            .context("Data channel is not open yet")?;
        channel.send(&data).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
