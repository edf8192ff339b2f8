use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of one signaling connection, assigned by the relay when the socket opens.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ConnectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PeerRole {
    Host,
    Admin,
    Viewer,
}

impl PeerRole {
    /// Admins are the only role allowed to drive the host's input.
    pub fn can_control(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for PeerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Host => "host",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        };
        f.write_str(name)
    }
}

/// Roles a peer may request when joining an existing session.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum JoinRole {
    Admin,
    Viewer,
}

impl From<JoinRole> for PeerRole {
    fn from(role: JoinRole) -> Self {
        match role {
            JoinRole::Admin => PeerRole::Admin,
            JoinRole::Viewer => PeerRole::Viewer,
        }
    }
}

impl fmt::Display for JoinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PeerRole::from(*self).fmt(f)
    }
}
