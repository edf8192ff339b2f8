use crate::model::error::{ErrorCode, ErrorPayload};
use crate::model::peer::ConnectionId;
use crate::model::session::{
    JoinSessionPayload, JoinSessionResponse, PeerJoinedPayload, PeerLeftPayload,
    RegisterHostPayload, RegisterHostResponse,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdpPayload {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcePayload {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
}

impl IcePayload {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Signal {
    Sdp(SdpPayload),
    Ice(IcePayload),
}

/// Negotiation payload relayed between two connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPayload {
    pub target_id: ConnectionId,
    /// Overwritten by the relay with the real sending connection.
    #[serde(default)]
    pub sender_id: Option<ConnectionId>,
    pub signal: Signal,
}

impl SignalPayload {
    pub fn offer(target_id: ConnectionId, sdp: impl Into<String>) -> Self {
        Self::sdp(target_id, SdpKind::Offer, sdp)
    }

    pub fn answer(target_id: ConnectionId, sdp: impl Into<String>) -> Self {
        Self::sdp(target_id, SdpKind::Answer, sdp)
    }

    pub fn ice(target_id: ConnectionId, candidate: IcePayload) -> Self {
        Self {
            target_id,
            sender_id: None,
            signal: Signal::Ice(candidate),
        }
    }

    fn sdp(target_id: ConnectionId, kind: SdpKind, sdp: impl Into<String>) -> Self {
        Self {
            target_id,
            sender_id: None,
            signal: Signal::Sdp(SdpPayload {
                kind,
                sdp: sdp.into(),
            }),
        }
    }

    fn is_sdp(&self, expected: SdpKind) -> bool {
        matches!(&self.signal, Signal::Sdp(p) if p.kind == expected)
    }

    fn is_ice(&self) -> bool {
        matches!(self.signal, Signal::Ice(_))
    }
}

/// Frames a peer sends to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    RegisterHost(RegisterHostPayload),
    JoinSession(JoinSessionPayload),
    Offer(SignalPayload),
    Answer(SignalPayload),
    IceCandidate(SignalPayload),
}

impl ClientMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterHost(_) => "register-host",
            Self::JoinSession(_) => "join-session",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
        }
    }

    /// Checks that relayed payloads carry the signal their message type promises.
    pub fn validate(&self) -> Result<(), ErrorCode> {
        let valid = match self {
            Self::RegisterHost(_) | Self::JoinSession(_) => true,
            Self::Offer(p) => p.is_sdp(SdpKind::Offer),
            Self::Answer(p) => p.is_sdp(SdpKind::Answer),
            Self::IceCandidate(p) => p.is_ice(),
        };

        if valid {
            Ok(())
        } else {
            Err(ErrorCode::InvalidMessage)
        }
    }
}

/// Frames the relay sends to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    RegisterHostResponse(RegisterHostResponse),
    JoinSessionResponse(JoinSessionResponse),
    Offer(SignalPayload),
    Answer(SignalPayload),
    IceCandidate(SignalPayload),
    PeerJoined(PeerJoinedPayload),
    PeerLeft(PeerLeftPayload),
    SessionExpired,
    Error(ErrorPayload),
}

impl ServerMessage {
    pub fn error(code: ErrorCode) -> Self {
        Self::Error(ErrorPayload::from(code))
    }

    pub fn peer_left(peer_id: ConnectionId) -> Self {
        Self::PeerLeft(PeerLeftPayload { peer_id })
    }
}
