//! Per-provider usage tracking
//!
//! In-process counters over a rolling day. Non-durable by design: the
//! windows are daily and the per-caller admission controller is the hard
//! backstop, so a restart losing these counters is acceptable.

use crate::config::ProviderConfig;
use crate::utils::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Consecutive errors after which a provider is marked unavailable until its
/// next reset (soft circuit breaker)
pub const ERROR_TRIP_THRESHOLD: u32 = 3;

/// Counter window
fn reset_window() -> Duration {
    Duration::hours(24)
}

/// Usage counters for one provider
#[derive(Debug, Clone)]
pub struct ProviderUsage {
    pub requests_today: u32,
    pub error_count: u32,
    pub last_reset: DateTime<Utc>,
}

impl ProviderUsage {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            requests_today: 0,
            error_count: 0,
            last_reset: now,
        }
    }
}

/// Tracks request and error counts per provider
///
/// Shared across all in-flight requests. Increments are taken under the map
/// lock, but availability checks and subsequent increments are not atomic
/// with respect to each other, so usage can exceed a provider's daily quota
/// slightly under heavy concurrency.
pub struct UsageTracker {
    states: Mutex<HashMap<String, ProviderUsage>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Record a successful request against a provider
    pub fn record_success(&self, name: &str, now: DateTime<Utc>) {
        let mut states = self.states.lock().unwrap();
        let state = states
            .entry(name.to_string())
            .or_insert_with(|| ProviderUsage::fresh(now));
        state.requests_today += 1;
    }

    /// Record a failed request against a provider
    pub fn record_failure(&self, name: &str, now: DateTime<Utc>) {
        let mut states = self.states.lock().unwrap();
        let state = states
            .entry(name.to_string())
            .or_insert_with(|| ProviderUsage::fresh(now));
        state.error_count += 1;
    }

    /// Whether a provider may receive traffic right now
    ///
    /// Available when its window has elapsed (pending sweep) or it is under
    /// its daily quota, and its error count has not tripped the breaker.
    pub fn is_available(&self, provider: &ProviderConfig, now: DateTime<Utc>) -> bool {
        let mut states = self.states.lock().unwrap();
        let state = states
            .entry(provider.name.clone())
            .or_insert_with(|| ProviderUsage::fresh(now));

        let window_elapsed = now - state.last_reset >= reset_window();

        (window_elapsed || state.requests_today < provider.daily_quota)
            && state.error_count < ERROR_TRIP_THRESHOLD
    }

    /// Reset counters for every provider whose window has elapsed
    ///
    /// Runs on a fixed timer independent of traffic, so idle providers
    /// recover too.
    pub fn sweep(&self, now: DateTime<Utc>) {
        let mut states = self.states.lock().unwrap();
        for (name, state) in states.iter_mut() {
            if now - state.last_reset >= reset_window() {
                debug!("Resetting usage counters for provider '{}'", name);
                *state = ProviderUsage::fresh(now);
            }
        }
    }

    /// Snapshot of all counters (health reporting)
    pub fn snapshot(&self) -> HashMap<String, ProviderUsage> {
        self.states.lock().unwrap().clone()
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the hourly sweep task
pub fn spawn_hourly_sweep(usage: Arc<UsageTracker>, clock: Arc<dyn Clock>) -> JoinHandle<()> {
    info!("Starting hourly usage sweep task");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            usage.sweep(clock.now());
            debug!("Usage sweep completed");
        }
    })
}
