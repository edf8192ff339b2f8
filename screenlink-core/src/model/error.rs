use serde::{Deserialize, Serialize};

/// Protocol errors returned to the requesting connection. None of them close the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    #[error("session not found")]
    SessionNotFound,

    #[error("session has expired")]
    SessionExpired,

    #[error("invalid session code")]
    InvalidCode,

    #[error("session already has an admin")]
    AdminAlreadyExists,

    #[error("session requires a PIN")]
    PinRequired,

    #[error("incorrect PIN")]
    InvalidPin,

    /// Frame did not decode into a known message, or its payload did not match its type.
    #[error("malformed message")]
    InvalidMessage,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::InvalidCode => "INVALID_CODE",
            Self::AdminAlreadyExists => "ADMIN_ALREADY_EXISTS",
            Self::PinRequired => "PIN_REQUIRED",
            Self::InvalidPin => "INVALID_PIN",
            Self::InvalidMessage => "INVALID_MESSAGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

impl From<ErrorCode> for ErrorPayload {
    fn from(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.to_string(),
        }
    }
}
