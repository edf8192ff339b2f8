mod connection_hub;
mod relay_output;
mod router;
mod ws_handler;

pub use connection_hub::*;
pub use relay_output::*;
pub use router::*;
pub use ws_handler::*;
