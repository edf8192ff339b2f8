use screenlink_core::IceServerConfig;
use screenlink_core::utils::{DEFAULT_SERVER_URL, default_ice_servers};
use std::time::Duration;

/// How long a dropped link may try to recover before it is declared failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Upper bound from transport creation to the first `connected`.
    pub handshake_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
            handshake_timeout: Duration::from_secs(10),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalingClientConfig {
    pub url: String,
    /// Applies to every request that waits for a relay response.
    pub join_timeout: Duration,
}

impl Default for SignalingClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_owned(),
            join_timeout: Duration::from_secs(10),
        }
    }
}
