mod dispatcher;
mod keymap;

pub use dispatcher::*;
pub use keymap::*;
