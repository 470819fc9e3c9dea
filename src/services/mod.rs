//! Services module
//!
//! Core business logic: error classification, per-provider usage tracking,
//! retry/failover orchestration, per-caller admission, and reply sanitizing

pub mod admission;
pub mod classifier;
pub mod orchestrator;
pub mod sanitizer;
pub mod usage;

pub use admission::{AdmissionController, AdmissionDecision, CounterStore, MemoryCounterStore, RedisCounterStore};
pub use classifier::{classify, ErrorKind};
pub use orchestrator::{Orchestrator, MAX_RETRIES};
pub use sanitizer::sanitize;
pub use usage::{spawn_hourly_sweep, UsageTracker};
