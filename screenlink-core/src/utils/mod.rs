mod coords;
mod session_code;
mod throttle;

pub use coords::{denormalize_coords, normalize_coords};
pub use session_code::{format_session_code, generate_session_code, is_valid_session_code};
pub use throttle::Throttle;

use crate::model::IceServerConfig;
use std::time::Duration;

pub const SESSION_CODE_SEGMENTS: usize = 3;
pub const SESSION_CODE_SEGMENT_LENGTH: usize = 3;
pub const SESSION_CODE_SEPARATOR: char = '-';
/// 32 symbols without the O/0 and I/1 look-alikes.
pub const SESSION_CODE_CHARSET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const DEFAULT_SESSION_EXPIRY: Duration = Duration::from_secs(10 * 60);

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:3000/ws";

pub const INPUT_DATA_CHANNEL: &str = "input";

/// Mouse-move events per second forwarded to the host.
pub const MOUSE_MOVE_RATE: u32 = 30;
/// Scroll events per second forwarded to the host.
pub const MOUSE_SCROLL_RATE: u32 = 20;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_3: &str = "stun:stun2.l.google.com:19302";

const OPEN_RELAY_TURN: [&str; 3] = [
    "turn:openrelay.metered.ca:80",
    "turn:openrelay.metered.ca:443",
    "turn:openrelay.metered.ca:443?transport=tcp",
];
const OPEN_RELAY_CREDENTIAL: &str = "openrelayproject";

/// Public STUN servers plus the Open Relay TURN fallback for symmetric NAT.
pub fn default_ice_servers() -> Vec<IceServerConfig> {
    let stun = IceServerConfig {
        urls: vec![
            DEFAULT_STUN_ADDR.to_owned(),
            DEFAULT_STUN_ADDR_2.to_owned(),
            DEFAULT_STUN_ADDR_3.to_owned(),
        ],
        username: None,
        credential: None,
    };

    let turn = OPEN_RELAY_TURN.iter().map(|url| IceServerConfig {
        urls: vec![(*url).to_owned()],
        username: Some(OPEN_RELAY_CREDENTIAL.to_owned()),
        credential: Some(OPEN_RELAY_CREDENTIAL.to_owned()),
    });

    std::iter::once(stun).chain(turn).collect()
}
