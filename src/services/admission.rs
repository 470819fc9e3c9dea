//! Per-caller admission control
//!
//! Fixed 24h window quota backed by a shared counter store. This is the hard
//! backstop in front of the providers: the per-provider usage tracker is
//! advisory, this one rejects.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Fixed admission window
pub const ADMISSION_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

const KEY_PREFIX: &str = "rate-limit:";

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Request admitted; count is the caller's tally after this request
    Allowed { count: u64 },
    /// Request rejected until the window resets
    Rejected { reset_at: DateTime<Utc> },
}

/// Shared counter store
///
/// The increment is the only operation requiring cross-process atomicity:
/// it must create the key with a TTL and increment it as one step.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current counter value, if the key exists
    async fn get(&self, key: &str) -> Result<Option<u64>>;

    /// Atomically increment; `window` becomes the TTL only when the key is
    /// created by this call. Later increments never refresh the TTL.
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64>;

    /// Remaining TTL for the key
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;
}

/// INCR plus conditional EXPIRE as a single atomic script
const INCR_WITH_EXPIRY_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
"#;

/// Redis-backed counter store, shared across process instances
pub struct RedisCounterStore {
    conn: ConnectionManager,
    incr_script: redis::Script,
}

impl RedisCounterStore {
    /// Connect to Redis
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).context("Invalid Redis URL")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        info!("Connected to shared counter store");

        Ok(Self {
            conn,
            incr_script: redis::Script::new(INCR_WITH_EXPIRY_SCRIPT),
        })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>> {
        let mut conn = self.conn.clone();
        let value: Option<u64> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .context("Counter store GET failed")?;
        Ok(value)
    }

    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64> {
        let mut conn = self.conn.clone();
        let count: u64 = self
            .incr_script
            .key(key)
            .arg(window.as_secs())
            .invoke_async(&mut conn)
            .await
            .context("Counter store INCR failed")?;
        Ok(count)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.conn.clone();
        let secs: i64 = redis::cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .context("Counter store TTL failed")?;
        // -1: no TTL set, -2: key missing
        Ok((secs > 0).then(|| Duration::from_secs(secs as u64)))
    }
}

struct CounterEntry {
    count: u64,
    expires_at: Instant,
}

/// In-process counter store
///
/// Fallback when no Redis URL is configured (single-instance deployments)
/// and the test double. Not shared across processes.
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, CounterEntry>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.count)),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(CounterEntry {
            count: 0,
            expires_at: now + window,
        });

        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + window;
        }

        entry.count += 1;
        Ok(entry.count)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .and_then(|e| e.expires_at.checked_duration_since(Instant::now())))
    }
}

/// Per-caller daily admission quota
pub struct AdmissionController {
    store: Arc<dyn CounterStore>,
    quota: u64,
    exempt_caller: Option<String>,
}

impl AdmissionController {
    pub fn new(store: Arc<dyn CounterStore>, quota: u64, exempt_caller: Option<String>) -> Self {
        Self {
            store,
            quota,
            exempt_caller,
        }
    }

    /// Check and count one request for a caller
    ///
    /// Check-then-increment: exactly `quota` requests are admitted before
    /// the first rejection. The exempt caller bypasses the check but is
    /// still counted.
    pub async fn check(&self, caller_id: &str, now: DateTime<Utc>) -> Result<AdmissionDecision> {
        let key = format!("{}{}", KEY_PREFIX, caller_id);
        let exempt = self.exempt_caller.as_deref() == Some(caller_id);

        let count = self.store.get(&key).await?.unwrap_or(0);

        if !exempt && count >= self.quota {
            let remaining = self.store.ttl(&key).await?.unwrap_or(ADMISSION_WINDOW);
            let reset_at = now
                + ChronoDuration::from_std(remaining)
                    .unwrap_or_else(|_| ChronoDuration::hours(24));

            warn!(
                "Caller '{}' exceeded admission quota ({}), resets at {}",
                caller_id, self.quota, reset_at
            );

            return Ok(AdmissionDecision::Rejected { reset_at });
        }

        let count = self.store.incr_with_expiry(&key, ADMISSION_WINDOW).await?;

        if exempt && count > self.quota {
            debug!(
                "Exempt caller '{}' admitted past quota (count {})",
                caller_id, count
            );
        }

        Ok(AdmissionDecision::Allowed { count })
    }
}
