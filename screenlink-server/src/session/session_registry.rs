use crate::session::{PeerRemoval, Session};
use screenlink_core::utils::{generate_session_code, is_valid_session_code};
use screenlink_core::{ConnectionId, ErrorCode, JoinRole};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Emitted by a session's timer when its deadline passes.
///
/// The registry does not remove anything on its own; the owner feeds the notice back through
/// [`SessionRegistry::take_expired`] from its own event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryNotice {
    pub code: String,
    pub deadline: Instant,
}

struct SessionEntry {
    session: Session,
    pin: Option<String>,
    timer: Option<JoinHandle<()>>,
}

impl SessionEntry {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

pub struct SessionRegistry {
    sessions: HashMap<String, SessionEntry>,
    expiry_tx: mpsc::UnboundedSender<ExpiryNotice>,
}

impl SessionRegistry {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ExpiryNotice>) {
        let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();

        let registry = Self {
            sessions: HashMap::new(),
            expiry_tx,
        };

        (registry, expiry_rx)
    }

    /// Creates a session owned by `host_id`. An empty PIN counts as no PIN.
    pub fn create_session(
        &mut self,
        host_id: ConnectionId,
        ttl: Option<Duration>,
        pin: Option<String>,
    ) -> Session {
        let code = loop {
            let candidate = generate_session_code();
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let now = Instant::now();
        let expires_at = ttl.map(|ttl| now + ttl);
        let timer = expires_at.map(|deadline| self.spawn_timer(code.clone(), deadline));
        let pin = pin.filter(|p| !p.is_empty());

        let session = Session {
            code: code.clone(),
            host_id,
            created_at: now,
            expires_at,
            admin_id: None,
            viewer_ids: Vec::new(),
        };

        info!(
            "Session {} created (host: {}, ttl: {:?}, pin: {})",
            code,
            host_id,
            ttl,
            pin.is_some()
        );

        self.sessions.insert(
            code,
            SessionEntry {
                session: session.clone(),
                pin,
                timer,
            },
        );

        session
    }

    /// Runs the join checks in order without admitting anyone. Returns the canonical code.
    pub fn check_join(
        &self,
        code: &str,
        peer_id: ConnectionId,
        role: JoinRole,
        pin: Option<&str>,
    ) -> Result<String, ErrorCode> {
        if !is_valid_session_code(code) {
            return Err(ErrorCode::InvalidCode);
        }

        let code = code.to_ascii_uppercase();
        let entry = self.sessions.get(&code).ok_or(ErrorCode::SessionNotFound)?;

        if entry.session.is_expired_at(Instant::now()) {
            return Err(ErrorCode::SessionExpired);
        }

        if let Some(expected) = entry.pin.as_deref() {
            match pin.filter(|p| !p.is_empty()) {
                None => return Err(ErrorCode::PinRequired),
                Some(given) if given != expected => return Err(ErrorCode::InvalidPin),
                Some(_) => {}
            }
        }

        if role == JoinRole::Admin && entry.session.admin_id.is_some_and(|id| id != peer_id) {
            return Err(ErrorCode::AdminAlreadyExists);
        }

        Ok(code)
    }

    /// Admits `peer_id` into the session. Nothing changes when an error is returned.
    pub fn join_session(
        &mut self,
        code: &str,
        peer_id: ConnectionId,
        role: JoinRole,
        pin: Option<&str>,
    ) -> Result<Session, ErrorCode> {
        let code = self.check_join(code, peer_id, role, pin)?;
        let entry = self
            .sessions
            .get_mut(&code)
            .ok_or(ErrorCode::SessionNotFound)?;

        match role {
            JoinRole::Admin => entry.session.admin_id = Some(peer_id),
            JoinRole::Viewer => {
                if !entry.session.viewer_ids.contains(&peer_id) {
                    entry.session.viewer_ids.push(peer_id);
                }
            }
        }

        info!("{} {} joined session {}", role, peer_id, code);
        Ok(entry.session.clone())
    }

    /// Deletes the session, its PIN and its timer. Unknown codes are ignored.
    pub fn remove_session(&mut self, code: &str) -> Option<Session> {
        let mut entry = self.sessions.remove(code)?;
        entry.cancel_timer();

        info!("Session {} removed", code);
        Some(entry.session)
    }

    pub fn remove_peer_from_session(&mut self, peer_id: &ConnectionId) -> Option<PeerRemoval> {
        let entry = self
            .sessions
            .values_mut()
            .find(|entry| entry.session.contains(peer_id))?;
        let session = &mut entry.session;

        if session.host_id == *peer_id {
            return Some(PeerRemoval {
                session: session.clone(),
                was_host: true,
            });
        }

        if session.admin_id.as_ref() == Some(peer_id) {
            session.admin_id = None;
        } else {
            session.viewer_ids.retain(|id| id != peer_id);
        }

        debug!("Peer {} detached from session {}", peer_id, session.code);
        Some(PeerRemoval {
            session: session.clone(),
            was_host: false,
        })
    }

    /// Removes the session named by a timer notice, returning its final snapshot.
    ///
    /// Notices whose deadline no longer matches (the session was removed and the code reused)
    /// are ignored.
    pub fn take_expired(&mut self, notice: &ExpiryNotice) -> Option<Session> {
        let entry = self.sessions.get(&notice.code)?;
        if entry.session.expires_at != Some(notice.deadline) {
            debug!("Ignoring stale expiry notice for {}", notice.code);
            return None;
        }

        info!("Session {} expired", notice.code);
        self.remove_session(&notice.code)
    }

    pub fn get_session(&self, code: &str) -> Option<&Session> {
        self.sessions
            .get(&code.to_ascii_uppercase())
            .map(|entry| &entry.session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn spawn_timer(&self, code: String, deadline: Instant) -> JoinHandle<()> {
        let expiry_tx = self.expiry_tx.clone();

        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = expiry_tx.send(ExpiryNotice { code, deadline });
        })
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        for entry in self.sessions.values_mut() {
            entry.cancel_timer();
        }
    }
}
