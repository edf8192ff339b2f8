use screenlink_core::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("signaling error: {0}")]
    Signaling(String),

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// The relay answered with a protocol error.
    #[error("relay refused the request: {0}")]
    Protocol(ErrorCode),

    #[error("connection closed")]
    Closed,

    #[error("input codec error: {0}")]
    Codec(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Signaling(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
