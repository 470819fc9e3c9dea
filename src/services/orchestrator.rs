//! Retry/failover orchestration
//!
//! Owns provider selection, the per-provider attempt loop with backoff, and
//! the cascade to lower-priority providers. All failover decisions live
//! here; callers delegate and never advance the provider chain themselves.

use crate::models::chat::ChatMessage;
use crate::providers::{ProviderError, ProviderRegistry};
use crate::services::classifier::{classify, ErrorKind};
use crate::services::usage::UsageTracker;
use crate::utils::clock::Clock;
use crate::utils::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Attempts per provider before giving up on it
pub const MAX_RETRIES: u32 = 3;

const BACKOFF_BASE_MS: u64 = 1000;
const BACKOFF_CAP_MS: u64 = 4000;

/// System message prepended when the conversation is handed to a fallback
/// provider mid-request
const FAILOVER_CONTEXT: &str = "You are continuing a conversation that was handed over from \
     another assistant. Answer the last user message directly, in Arabic, \
     without mentioning the handover.";

/// Backoff before retry `attempt` (0-based), clamped at the cap
pub fn backoff_delay(attempt: u32) -> Duration {
    let ms = std::cmp::min(BACKOFF_BASE_MS * 2_u64.pow(attempt.min(16)), BACKOFF_CAP_MS);
    Duration::from_millis(ms)
}

/// Retry/failover orchestrator
pub struct Orchestrator {
    registry: ProviderRegistry,
    usage: Arc<UsageTracker>,
    clock: Arc<dyn Clock>,
}

impl Orchestrator {
    pub fn new(registry: ProviderRegistry, usage: Arc<UsageTracker>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            usage,
            clock,
        }
    }

    /// Index of the first available provider at or after `from`, in registry
    /// priority order
    fn next_available(&self, from: usize) -> Option<usize> {
        let now = self.clock.now();
        self.registry
            .providers()
            .enumerate()
            .skip(from)
            .find(|(_, provider)| self.usage.is_available(provider, now))
            .map(|(index, _)| index)
    }

    /// Provider counts for health reporting: (total, available)
    pub fn provider_health(&self) -> (usize, usize) {
        let now = self.clock.now();
        let total = self.registry.len();
        let available = self
            .registry
            .providers()
            .filter(|provider| self.usage.is_available(provider, now))
            .count();
        (total, available)
    }

    /// Send a conversation, retrying and cascading as needed
    ///
    /// The cascade only moves forward through the registry, so the total
    /// attempt count is bounded by MAX_RETRIES times the provider count.
    pub async fn send(&self, messages: Vec<ChatMessage>) -> Result<String, AppError> {
        let mut index = self
            .next_available(0)
            .ok_or(AppError::NoProviderAvailable)?;
        let mut messages = messages;

        loop {
            let (provider, _) = self
                .registry
                .get(index)
                .ok_or(AppError::NoProviderAvailable)?;
            let provider_name = provider.name.clone();

            match self.execute(index, &messages).await {
                Ok(text) => return Ok(text),
                Err((err, ErrorKind::QuotaExceeded)) => {
                    match self.next_available(index + 1) {
                        Some(next) => {
                            warn!(
                                "Provider '{}' out of quota, cascading to next provider",
                                provider_name
                            );
                            // Fresh attempt counter on the fallback provider,
                            // with handover context prepended
                            messages.insert(0, ChatMessage::system(FAILOVER_CONTEXT));
                            index = next;
                        }
                        None => {
                            error!(
                                "Provider chain exhausted after '{}': {}",
                                provider_name, err
                            );
                            return Err(AppError::Upstream {
                                kind: ErrorKind::QuotaExceeded,
                            });
                        }
                    }
                }
                Err((err, kind)) => {
                    error!(
                        "Provider '{}' failed terminally ({:?}): {}",
                        provider_name, kind, err
                    );
                    return Err(AppError::Upstream { kind });
                }
            }
        }
    }

    /// Run the attempt loop against a single provider
    async fn execute(
        &self,
        index: usize,
        messages: &[ChatMessage],
    ) -> Result<String, (ProviderError, ErrorKind)> {
        let (provider, adapter) = match self.registry.get(index) {
            Some(entry) => entry,
            None => {
                return Err((
                    ProviderError::http(503, "provider index out of range"),
                    ErrorKind::Temporary,
                ))
            }
        };

        let mut last: Option<(ProviderError, ErrorKind)> = None;

        for attempt in 0..MAX_RETRIES {
            match adapter.dispatch(provider, messages).await {
                Ok(text) => {
                    self.usage.record_success(&provider.name, self.clock.now());
                    debug!(
                        "Provider '{}' answered on attempt {}",
                        provider.name,
                        attempt + 1
                    );
                    return Ok(text);
                }
                Err(err) => {
                    let kind = classify(&err);
                    self.usage.record_failure(&provider.name, self.clock.now());
                    warn!(
                        "Provider '{}' attempt {}/{} failed ({:?}): {}",
                        provider.name,
                        attempt + 1,
                        MAX_RETRIES,
                        kind,
                        err
                    );

                    match kind {
                        // Terminal for this provider; the caller decides
                        // whether the chain continues
                        ErrorKind::QuotaExceeded | ErrorKind::Permanent => {
                            return Err((err, kind))
                        }
                        ErrorKind::RateLimit => {
                            self.clock.sleep(backoff_delay(attempt) * 2).await;
                        }
                        ErrorKind::Temporary | ErrorKind::Network => {
                            self.clock.sleep(backoff_delay(attempt)).await;
                        }
                    }

                    last = Some((err, kind));
                }
            }
        }

        // MAX_RETRIES is nonzero, so at least one failure was recorded
        Err(last.expect("attempt loop ran at least once"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_doubles_then_clamps() {
        assert_eq!(backoff_delay(0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(2), Duration::from_millis(4000));
        // Clamped beyond the table the source used
        assert_eq!(backoff_delay(3), Duration::from_millis(4000));
        assert_eq!(backoff_delay(10), Duration::from_millis(4000));
        assert_eq!(backoff_delay(100), Duration::from_millis(4000));
    }
}
