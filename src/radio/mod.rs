//! Si4455 command set, status queries and configuration replay.

pub mod commands;
pub mod configure;
pub mod status;
pub mod tables;

pub use configure::{ConfigError, ConfigSource, StaticConfig};
pub use status::{FifoInfo, InterruptStatus, ModemStatus, PartInfo};
