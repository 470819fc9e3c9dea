//! Hadith chat gateway library
//!
//! Routes chat turns across an ordered chain of AI providers with retry,
//! quota-aware failover, per-caller admission control, and Arabic reply
//! sanitizing

pub mod config;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{AppConfig, ProviderConfig, Settings, WireFamily};
pub use handlers::{build_state, create_router, router_with_state, AppState};
pub use models::chat::{ChatMessage, ChatReply, ChatRequest};
pub use services::{AdmissionController, Orchestrator, UsageTracker};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
