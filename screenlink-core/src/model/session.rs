use crate::model::peer::{ConnectionId, JoinRole, PeerRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterHostPayload {
    /// Informational only; the relay always registers the sending connection.
    #[serde(default)]
    pub peer_id: Option<ConnectionId>,
    /// `None` keeps the session alive until the host leaves.
    #[serde(default)]
    pub expires_in_ms: Option<u64>,
    #[serde(default)]
    pub pin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterHostResponse {
    pub session_code: String,
    pub host_id: ConnectionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionPayload {
    pub session_code: String,
    pub role: JoinRole,
    #[serde(default)]
    pub pin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    pub host_id: ConnectionId,
    pub peer_id: ConnectionId,
    pub viewers: Vec<ConnectionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerJoinedPayload {
    pub peer_id: ConnectionId,
    pub role: PeerRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerLeftPayload {
    pub peer_id: ConnectionId,
}
