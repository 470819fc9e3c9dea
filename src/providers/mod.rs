//! Provider module
//!
//! Defines the adapter trait, the raw provider error carried out of an
//! adapter, and the registry that pairs each configured provider with the
//! adapter for its wire family.

pub mod google;
pub mod openai;

use crate::config::{ProviderConfig, WireFamily};
use crate::models::chat::ChatMessage;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// How an outbound connection failed before any HTTP status was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFailure {
    Refused,
    TimedOut,
}

/// Raw, unclassified provider failure
///
/// Carries everything the classifier needs: the upstream HTTP status if one
/// was produced, the transport-level failure mode if not, and the error body
/// or message for logging.
#[derive(Debug, Error)]
#[error("provider request failed (status {status:?}): {message}")]
pub struct ProviderError {
    pub status: Option<u16>,
    pub connection: Option<ConnectionFailure>,
    pub message: String,
}

impl ProviderError {
    /// Failure with an upstream HTTP status
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            connection: None,
            message: message.into(),
        }
    }

    /// Failure from the HTTP client before a response arrived
    pub fn from_transport(err: reqwest::Error) -> Self {
        let connection = if err.is_timeout() {
            Some(ConnectionFailure::TimedOut)
        } else if err.is_connect() {
            Some(ConnectionFailure::Refused)
        } else {
            None
        };

        Self {
            status: err.status().map(|s| s.as_u16()),
            connection,
            message: err.to_string(),
        }
    }
}

/// Adapter for one upstream wire-protocol family
///
/// Adapters normalize requests and responses only; classification and retry
/// decisions belong to the orchestrator.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Wire family this adapter speaks
    fn family(&self) -> WireFamily;

    /// Send the conversation upstream and return the reply text
    ///
    /// Returns `""` rather than an error when a success response has an
    /// unexpected or partial shape.
    async fn dispatch(
        &self,
        provider: &ProviderConfig,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError>;
}

/// Ordered provider registry
///
/// Pairs every configured provider with the adapter instance for its wire
/// family. Registry order is failover priority order. All credentials flow
/// through the configs held here.
pub struct ProviderRegistry {
    entries: Vec<(ProviderConfig, Arc<dyn ProviderAdapter>)>,
}

impl ProviderRegistry {
    /// Create a registry from configuration, building one adapter per family
    pub fn new(providers: Vec<ProviderConfig>) -> Result<Self> {
        let mut adapters: HashMap<WireFamily, Arc<dyn ProviderAdapter>> = HashMap::new();

        for provider in &providers {
            if !adapters.contains_key(&provider.family) {
                let adapter: Arc<dyn ProviderAdapter> = match provider.family {
                    WireFamily::Google => Arc::new(google::GoogleAdapter::new()?),
                    WireFamily::OpenAi => Arc::new(openai::OpenAiAdapter::new()?),
                };
                adapters.insert(provider.family, adapter);
            }
        }

        let entries = providers
            .into_iter()
            .map(|p| {
                let adapter = Arc::clone(&adapters[&p.family]);
                (p, adapter)
            })
            .collect::<Vec<_>>();

        info!("Provider registry initialized with {} providers", entries.len());

        Ok(Self { entries })
    }

    /// Create a registry from explicit provider/adapter pairs (tests)
    pub fn with_adapters(entries: Vec<(ProviderConfig, Arc<dyn ProviderAdapter>)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, index: usize) -> Option<(&ProviderConfig, &Arc<dyn ProviderAdapter>)> {
        self.entries.get(index).map(|(p, a)| (p, a))
    }

    /// Providers in priority order
    pub fn providers(&self) -> impl Iterator<Item = &ProviderConfig> + '_ {
        self.entries.iter().map(|(p, _)| p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub use google::GoogleAdapter;
pub use openai::OpenAiAdapter;
