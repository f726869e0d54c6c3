//! Configuration for the image service
//!
//! Values come from defaults, then `CITRA_*` environment variables, then
//! command-line flags.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Default bind address
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port
const DEFAULT_PORT: u16 = 5000;

/// Default upload limit (16 MiB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable could not be parsed
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// Value out of range
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// JPEG encoder quality (1-100)
    pub jpeg_quality: u8,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            jpeg_quality: citra_image::DEFAULT_JPEG_QUALITY,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `CITRA_HOST`: Bind address
    /// - `CITRA_PORT`: Bind port
    /// - `CITRA_MAX_UPLOAD_BYTES`: Request body limit in bytes
    /// - `CITRA_JPEG_QUALITY`: JPEG quality (1-100)
    /// - `CITRA_LOG_LEVEL`: Log filter
    /// - `CITRA_LOG_JSON`: `true`/`1` for JSON logs
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("CITRA_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "CITRA_PORT")? {
            config.port = port;
        }
        if let Some(limit) = parse_var(&lookup, "CITRA_MAX_UPLOAD_BYTES")? {
            config.max_upload_bytes = limit;
        }
        if let Some(quality) = parse_var(&lookup, "CITRA_JPEG_QUALITY")? {
            config.jpeg_quality = quality;
        }
        if let Some(level) = lookup("CITRA_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(json) = lookup("CITRA_LOG_JSON") {
            config.log_json = match json.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "CITRA_LOG_JSON",
                        value: json,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Validation(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "max_upload_bytes must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// `host:port` string for binding
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
