mod config;
mod relay;
mod session;
mod signaling;

pub use config::*;
pub use relay::*;
pub use session::*;
pub use signaling::*;
