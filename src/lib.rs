pub mod config;
pub mod host;
pub mod player;

pub use config::*;
pub use host::*;
pub use player::*;

pub use howl_core;
