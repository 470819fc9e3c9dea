//! Application runtime settings
//!
//! Loaded from environment variables; the provider registry comes from the
//! JSON file handled in `file.rs`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Per-caller admission control
    pub admission: AdmissionSettings,
    /// Shared counter store URL; in-process fallback when unset
    pub redis_url: Option<String>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Per-caller admission quota settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionSettings {
    /// Requests admitted per caller per 24h window
    pub daily_quota: u64,
    /// Caller id that bypasses the quota check (still counted)
    pub exempt_caller: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new settings instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            admission: AdmissionSettings {
                daily_quota: get_env_or_default("ADMISSION_DAILY_QUOTA", "15")
                    .parse()
                    .context("Invalid admission daily quota")?,
                exempt_caller: std::env::var("ADMISSION_EXEMPT_CALLER")
                    .ok()
                    .filter(|s| !s.is_empty()),
            },
            redis_url: std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if self.admission.daily_quota == 0 {
            anyhow::bail!("Admission daily quota cannot be 0");
        }

        if let Some(url) = &self.redis_url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                anyhow::bail!("Invalid Redis URL format: {}", url);
            }
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        // Validate log format
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
