mod agent;
mod config;
mod engine;
mod error;
mod input;
mod signaling;
mod transport;

pub use agent::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use input::*;
pub use signaling::*;
pub use transport::*;
