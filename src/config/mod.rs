//! Layered configuration (defaults, TOML file, environment)

pub mod loader;
pub mod types;

pub use loader::load_config;
pub use types::{AppConfig, ScanSettings, SleeperConfig};
