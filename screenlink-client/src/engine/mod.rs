mod connection_state;
mod engine_command;
mod engine_handle;
mod handle_remote_impl;
mod initiate_impl;
mod negotiation_engine;
mod transport_event_impl;

pub use connection_state::*;
pub(crate) use engine_command::*;
pub use engine_handle::*;
pub use negotiation_engine::*;
