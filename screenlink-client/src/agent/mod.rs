mod host;
mod viewer;

pub use host::*;
pub use viewer::*;
