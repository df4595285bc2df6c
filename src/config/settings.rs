//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the inference provider credential
pub const API_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub provider: ProviderConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Upload and output directories
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Write the original and mask PNGs next to the upload for inspection
    #[serde(default)]
    pub keep_intermediates: bool,
}

fn default_upload_dir() -> String {
    "static/uploads".to_string()
}

fn default_output_dir() -> String {
    "static/outputs".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

/// Inference provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_magic_prompt_option")]
    pub magic_prompt_option: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    #[serde(default, skip_serializing)]
    pub api_token: String,
}

fn default_api_base() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_model() -> String {
    "ideogram-ai/ideogram-v2-turbo".to_string()
}

fn default_aspect_ratio() -> String {
    "1:1".to_string()
}

fn default_magic_prompt_option() -> String {
    "Auto".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_poll_timeout() -> u64 {
    300
}

/// Rate limiting configuration for the processing endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_true() -> bool {
    true
}

fn default_rps() -> u32 {
    2
}

fn default_burst() -> u32 {
    5
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("storage.upload_dir", default_upload_dir())?
            .set_default("storage.output_dir", default_output_dir())?
            .set_default("provider.api_base", default_api_base())?
            .set_default("provider.model", default_model())?
            .set_default("rate_limit.enabled", true)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Load from configuration file
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (prefixed with INPAINT__)
            .add_source(
                Environment::with_prefix("INPAINT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        if settings.provider.api_token.trim().is_empty() {
            settings.provider.api_token = std::env::var(API_TOKEN_ENV).unwrap_or_default();
        }

        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_token.trim().is_empty() {
            return Err(AppError::config(format!(
                "{} is not set in the environment",
                API_TOKEN_ENV
            )));
        }

        if self.server.port == 0 {
            return Err(AppError::config("Server port cannot be 0"));
        }

        if self.provider.model.split('/').filter(|part| !part.is_empty()).count() != 2 {
            return Err(AppError::config(format!(
                "Provider model '{}' must look like 'owner/name'",
                self.provider.model
            )));
        }

        if self.storage.allowed_extensions.is_empty() {
            return Err(AppError::config("At least one upload extension must be allowed"));
        }

        if self.storage.upload_dir == self.storage.output_dir {
            return Err(AppError::config(
                "Upload and output directories must be different",
            ));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            storage: StorageConfig {
                upload_dir: default_upload_dir(),
                output_dir: default_output_dir(),
                allowed_extensions: default_allowed_extensions(),
                max_upload_bytes: default_max_upload_bytes(),
                keep_intermediates: false,
            },
            provider: ProviderConfig {
                api_base: default_api_base(),
                model: default_model(),
                aspect_ratio: default_aspect_ratio(),
                magic_prompt_option: default_magic_prompt_option(),
                poll_interval_ms: default_poll_interval(),
                poll_timeout_secs: default_poll_timeout(),
                api_token: String::new(),
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                requests_per_second: default_rps(),
                burst_size: default_burst(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
