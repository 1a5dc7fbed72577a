pub mod bridge;
pub mod config;
pub mod error;
pub mod models;

pub use bridge::{Bridge, RunReport};
pub use config::Config;
pub use error::{BridgeError, Result};
