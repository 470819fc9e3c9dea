//! Health check handlers
//!
//! Provides application health status check endpoints

use crate::handlers::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Version information
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    /// Details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// Check result
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    /// Configured providers
    pub providers_total: usize,
    /// Providers currently accepting traffic
    pub providers_available: usize,
    /// Uptime in seconds
    pub uptime_seconds: u64,
}

/// Basic health check
///
/// Degrades to 503 when every provider is quota-exhausted or breaker-tripped;
/// the degraded body still reports the provider counts
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    debug!("Executing health check");

    let (total, available) = state.orchestrator.provider_health();

    let (status_code, status) = if available > 0 {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status: status.to_string(),
        service: "hadithgw".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: Some(HealthDetails {
            providers_total: total,
            providers_available: available,
            uptime_seconds: get_uptime_seconds(),
        }),
    };

    (status_code, Json(response))
}

/// Liveness check
///
/// GET /health/live
/// Confirms the process is running; does not check providers
pub async fn liveness_check(
    State(_state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, StatusCode> {
    debug!("Executing liveness check");

    let response = HealthResponse {
        status: "alive".to_string(),
        service: "hadithgw".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: None,
    };

    Ok(Json(response))
}

/// Get service uptime in seconds
fn get_uptime_seconds() -> u64 {
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    static START_TIME: OnceLock<u64> = OnceLock::new();

    let start_time = *START_TIME.get_or_init(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    });

    let current_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    current_time.saturating_sub(start_time)
}
