//! Request handlers module
//!
//! Wires the service layer into the axum router and holds shared state

pub mod chat;
pub mod health;

use crate::config::{AppConfig, Settings};
use crate::providers::ProviderRegistry;
use crate::services::admission::{AdmissionController, CounterStore, MemoryCounterStore, RedisCounterStore};
use crate::services::orchestrator::Orchestrator;
use crate::services::usage::UsageTracker;
use crate::utils::clock::{Clock, SystemClock};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    pub admission: AdmissionController,
    pub orchestrator: Orchestrator,
    pub usage: Arc<UsageTracker>,
    pub clock: Arc<dyn Clock>,
}

/// Build the shared state from configuration
pub async fn build_state(settings: Settings, app_config: AppConfig) -> Result<Arc<AppState>> {
    let registry = ProviderRegistry::new(app_config.providers)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let usage = Arc::new(UsageTracker::new());

    let store: Arc<dyn CounterStore> = match &settings.redis_url {
        Some(url) => Arc::new(RedisCounterStore::connect(url).await?),
        None => {
            warn!("REDIS_URL not set, using in-process admission counters");
            Arc::new(MemoryCounterStore::new())
        }
    };

    let admission = AdmissionController::new(
        store,
        settings.admission.daily_quota,
        settings.admission.exempt_caller.clone(),
    );

    let orchestrator = Orchestrator::new(registry, Arc::clone(&usage), Arc::clone(&clock));

    Ok(Arc::new(AppState {
        settings,
        admission,
        orchestrator,
        usage,
        clock,
    }))
}

/// Build the router around an existing state (tests inject fakes here)
pub fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/chat", post(chat::handle_chat))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Create the application router from configuration
pub async fn create_router(settings: Settings, app_config: AppConfig) -> Result<Router> {
    let state = build_state(settings, app_config).await?;
    Ok(router_with_state(state))
}
