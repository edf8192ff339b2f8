pub use screenlink_core::model::{ConnectionId, ErrorCode, JoinRole, PeerRole};

pub mod model {
    pub use screenlink_core::model::*;
}

pub mod utils {
    pub use screenlink_core::utils::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use screenlink_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use screenlink_client::*;
}
