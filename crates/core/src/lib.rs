//! # shop-core
//!
//! Configuration and logging shared by the order query layer and its CLI.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, AppConfigTrait, ConfigError, ConfigSource, Environment, BATCH_FETCH_SIZE_MAX,
    BATCH_FETCH_SIZE_MIN, DEFAULT_BATCH_FETCH_SIZE, DEFAULT_PAGE_LIMIT,
};
pub use logging::{init_logging, LoggingConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
