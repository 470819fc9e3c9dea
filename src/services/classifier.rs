//! Failure classification
//!
//! Maps a raw provider failure to the small taxonomy the orchestrator
//! branches on. Separates "back off, same provider" from "abandon provider,
//! fail over" from "give up".

use crate::providers::ProviderError;

/// Classified failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream throttling; retry the same provider with extended backoff
    RateLimit,
    /// Upstream quota exhausted; cascade to the next provider
    QuotaExceeded,
    /// Transient upstream failure; retry the same provider
    Temporary,
    /// Client-side failure; not retryable
    Permanent,
    /// Connection refused or timed out; retry the same provider
    Network,
}

/// Classify a raw provider failure
///
/// Pure and total. Status dominates message text; message matching is
/// case-insensitive. Unknown failures default to `Temporary`, the safe
/// retryable choice.
pub fn classify(err: &ProviderError) -> ErrorKind {
    let message = err.message.to_lowercase();

    if err.status == Some(429) || message.contains("rate limit") {
        return ErrorKind::RateLimit;
    }

    if err.status == Some(403) || message.contains("quota") {
        return ErrorKind::QuotaExceeded;
    }

    if let Some(status) = err.status {
        if status >= 500 {
            return ErrorKind::Temporary;
        }
        if (400..500).contains(&status) {
            return ErrorKind::Permanent;
        }
    }

    if err.connection.is_some() {
        return ErrorKind::Network;
    }

    ErrorKind::Temporary
}
