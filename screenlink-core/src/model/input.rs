use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    MouseMove,
    MouseClick,
    MouseDown,
    MouseUp,
    MouseScroll,
    KeyPress,
    KeyRelease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input event sent by an admin over the `input` data channel.
///
/// `x`/`y` are normalized to the sender's video element (0.0 - 1.0), so the receiver
/// scales them against its own screen instead of trusting the sender's resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    #[serde(rename = "t")]
    pub kind: InputKind,
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(rename = "b")]
    pub button: Option<MouseButton>,
    #[serde(rename = "d")]
    pub delta: Option<f64>,
    /// Platform key identifier (browser `KeyboardEvent.code`).
    #[serde(rename = "k")]
    pub key: Option<String>,
    pub ts: u64,
}

impl InputMessage {
    fn bare(kind: InputKind, ts: u64) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            button: None,
            delta: None,
            key: None,
            ts,
        }
    }

    pub fn mouse_move(x: f64, y: f64, ts: u64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::bare(InputKind::MouseMove, ts)
        }
    }

    pub fn mouse_button(kind: InputKind, button: MouseButton, ts: u64) -> Self {
        Self {
            button: Some(button),
            ..Self::bare(kind, ts)
        }
    }

    pub fn scroll(delta: f64, ts: u64) -> Self {
        Self {
            delta: Some(delta),
            ..Self::bare(InputKind::MouseScroll, ts)
        }
    }

    pub fn key(kind: InputKind, key: impl Into<String>, ts: u64) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::bare(kind, ts)
        }
    }

    /// Compact binary form used on the data channel.
    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
