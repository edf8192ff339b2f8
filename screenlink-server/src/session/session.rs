use screenlink_core::ConnectionId;
use tokio::time::Instant;

/// Snapshot of a live session. The PIN is kept by the registry and never leaves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub code: String,
    pub host_id: ConnectionId,
    pub created_at: Instant,
    pub expires_at: Option<Instant>,
    pub admin_id: Option<ConnectionId>,
    pub viewer_ids: Vec<ConnectionId>,
}

impl Session {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now > deadline)
    }

    pub fn contains(&self, peer_id: &ConnectionId) -> bool {
        self.host_id == *peer_id
            || self.admin_id.as_ref() == Some(peer_id)
            || self.viewer_ids.contains(peer_id)
    }

    /// Host first, then the admin, then viewers in join order.
    pub fn members(&self) -> Vec<ConnectionId> {
        std::iter::once(self.host_id)
            .chain(self.admin_id)
            .chain(self.viewer_ids.iter().copied())
            .collect()
    }
}

/// Result of detaching a connection from whatever session it belonged to.
#[derive(Debug, Clone)]
pub struct PeerRemoval {
    pub session: Session,
    /// When set, `session` is the untouched snapshot and the caller must tear the session down.
    pub was_host: bool,
}
