//! Configuration module

pub mod settings;

pub use settings::{
    LoggingConfig, ProviderConfig, RateLimitConfig, ServerConfig, Settings, StorageConfig,
};
