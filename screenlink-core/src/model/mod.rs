mod error;
mod input;
mod peer;
mod session;
mod signaling;

pub use error::{ErrorCode, ErrorPayload};
pub use input::{InputKind, InputMessage, MouseButton};
pub use peer::{ConnectionId, JoinRole, PeerRole};
pub use session::{
    JoinSessionPayload, JoinSessionResponse, PeerJoinedPayload, PeerLeftPayload,
    RegisterHostPayload, RegisterHostResponse,
};
pub use signaling::{
    ClientMessage, IcePayload, IceServerConfig, SdpKind, SdpPayload, ServerMessage, Signal,
    SignalPayload,
};
