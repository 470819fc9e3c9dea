//! Google-family provider adapter
//!
//! Speaks the Gemini-style generateContent protocol. The API key travels as
//! a URL query parameter, so request URLs must never be logged.

use super::{ProviderAdapter, ProviderError};
use crate::config::{ProviderConfig, WireFamily};
use crate::models::chat::{ChatMessage, Role};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Google-style adapter
pub struct GoogleAdapter {
    client: Client,
}

impl GoogleAdapter {
    /// Create a new adapter; per-request timeouts come from provider config
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("hadithgw/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Build the request URL with the API key as a query parameter
    fn build_url(&self, provider: &ProviderConfig) -> String {
        let base_url = provider.base_url.trim_end_matches('/');
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            base_url, provider.model, provider.api_key
        )
    }
}

/// Wire role name; only "assistant" is remapped
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::User => "user",
        Role::System => "system",
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn family(&self) -> WireFamily {
        WireFamily::Google
    }

    async fn dispatch(
        &self,
        provider: &ProviderConfig,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        debug!("Dispatching to google-family provider '{}'", provider.name);

        let body = GenerateContentRequest {
            contents: messages
                .iter()
                .map(|m| Content {
                    role: wire_role(m.role).to_string(),
                    parts: vec![Part {
                        text: m.content.clone(),
                    }],
                })
                .collect(),
        };

        let url = self.build_url(provider);

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(provider.timeout_secs))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::http(status.as_u16(), error_text));
        }

        // Drifted or partial success shapes yield an empty reply, not an error
        let parsed: GenerateContentResponse = response.json().await.unwrap_or_default();

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        Ok(text)
    }
}
