use screenlink_core::{ConnectionId, PeerRole};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub connection_id: ConnectionId,
    pub role: PeerRole,
    pub session_code: String,
}

/// Connection id → role and session binding. Callers are responsible for consistency.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<ConnectionId, PeerInfo>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&mut self, info: PeerInfo) {
        self.peers.insert(info.connection_id, info);
    }

    pub fn remove_peer(&mut self, connection_id: &ConnectionId) -> Option<PeerInfo> {
        self.peers.remove(connection_id)
    }

    pub fn get_peer(&self, connection_id: &ConnectionId) -> Option<&PeerInfo> {
        self.peers.get(connection_id)
    }

    pub fn get_peers_by_session(&self, session_code: &str) -> Vec<PeerInfo> {
        self.peers
            .values()
            .filter(|peer| peer.session_code == session_code)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
