use std::fmt;

/// Application-level view of one peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No transport.
    Disconnected,
    /// Transport created; joining or creating the first offer.
    Connecting,
    /// Waiting for the remote side's offer or answer.
    Waiting,
    Connected,
    /// Link dropped; the transport is kept while recovery is attempted.
    Reconnecting,
    /// Terminal until torn down.
    Failed,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// States in which the link has been set up but not yet established.
    pub fn is_handshaking(self) -> bool {
        matches!(self, Self::Connecting | Self::Waiting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Waiting => "waiting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStatus {
    pub state: ConnectionState,
    /// Short user-facing explanation, set when `state` is `Failed`.
    pub reason: Option<String>,
}

impl LinkStatus {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state,
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            state: ConnectionState::Failed,
            reason: Some(reason.into()),
        }
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::new(ConnectionState::Disconnected)
    }
}
