//! OpenAI-family provider adapter
//!
//! Chat-completions wire protocol with bearer authentication.

use super::{ProviderAdapter, ProviderError};
use crate::config::{ProviderConfig, WireFamily};
use crate::models::chat::ChatMessage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// OpenAI-style adapter
pub struct OpenAiAdapter {
    client: Client,
}

impl OpenAiAdapter {
    /// Create a new adapter; per-request timeouts come from provider config
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("hadithgw/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Build the request URL
    fn build_url(&self, provider: &ProviderConfig) -> String {
        let base_url = provider.base_url.trim_end_matches('/');
        format!("{}/chat/completions", base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Default, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: ReplyMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn family(&self) -> WireFamily {
        WireFamily::OpenAi
    }

    async fn dispatch(
        &self,
        provider: &ProviderConfig,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        debug!("Dispatching to openai-family provider '{}'", provider.name);

        let body = ChatCompletionRequest {
            model: &provider.model,
            messages,
        };

        let url = self.build_url(provider);

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(provider.timeout_secs))
            .header("Authorization", format!("Bearer {}", provider.api_key))
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
        let parsed: ChatCompletionResponse = response.json().await.unwrap_or_default();

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(text)
    }
}
