//! File-based configuration loading
//!
//! Loads the provider registry from a JSON file. Provider order in the file
//! is the failover priority order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host (default: "127.0.0.1" - localhost only)
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default: 8082)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8082
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream wire-protocol family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFamily {
    /// Gemini-style generateContent protocol, key as query parameter
    Google,
    /// Chat-completions protocol, bearer auth
    #[serde(rename = "openai")]
    OpenAi,
}

/// Application configuration loaded from JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration (optional, defaults to localhost:8082)
    #[serde(default)]
    pub server: ServerConfig,

    /// Ordered provider configurations; index order defines fallback priority
    pub providers: Vec<ProviderConfig>,
}

/// A single upstream provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name, unique within the registry
    pub name: String,

    /// Wire-protocol family
    pub family: WireFamily,

    /// Base URL for the provider API
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    /// API key
    #[serde(rename = "apiKey", default)]
    pub api_key: String,

    /// Model id sent upstream
    pub model: String,

    /// Daily request ceiling for this provider
    #[serde(rename = "dailyQuota")]
    pub daily_quota: u32,

    /// Outbound request timeout in seconds
    #[serde(rename = "timeoutSecs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AppConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config JSON")?;

        config.validate()?;

        debug!("Loaded {} providers", config.providers.len());
        Ok(config)
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. ~/.config/hadithgw/hadithgw.json
    /// 2. ./hadithgw.json
    ///
    /// Returns error if no configuration file is found.
    pub fn load_default() -> Result<Self> {
        // Try home config directory first
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("hadithgw").join("hadithgw.json");
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        // Try current directory
        let local_path = Path::new("hadithgw.json");
        if local_path.exists() {
            return Self::load(local_path);
        }

        anyhow::bail!(
            "Configuration file not found. Please create one at:\n\
             - ~/.config/hadithgw/hadithgw.json (recommended)\n\
             - ./hadithgw.json (current directory)\n\
             \n\
             See hadithgw.example.json for reference."
        )
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            anyhow::bail!("At least one provider must be configured");
        }

        let mut seen = std::collections::HashSet::new();
        for provider in &self.providers {
            if provider.name.is_empty() {
                anyhow::bail!("Provider name cannot be empty");
            }

            if !seen.insert(provider.name.as_str()) {
                anyhow::bail!("Duplicate provider name: '{}'", provider.name);
            }

            if !provider.base_url.starts_with("http") {
                anyhow::bail!(
                    "Invalid base URL for provider '{}': {}",
                    provider.name,
                    provider.base_url
                );
            }

            if provider.model.is_empty() {
                anyhow::bail!("Provider '{}' must have a model configured", provider.name);
            }

            if provider.daily_quota == 0 {
                anyhow::bail!(
                    "Provider '{}' must have a daily quota greater than 0",
                    provider.name
                );
            }

            if provider.timeout_secs == 0 {
                anyhow::bail!("Provider '{}' timeout cannot be 0", provider.name);
            }
        }

        Ok(())
    }
}
