//! Hadith chat gateway server
//!
//! HTTP service that answers hadith-learning chat turns by routing them
//! across an ordered chain of AI providers with retry, quota-aware failover,
//! and per-caller admission control

use anyhow::{Context, Result};
use tracing::info;

use hadithgw::config::{AppConfig, Settings};
use hadithgw::handlers::{build_state, router_with_state};
use hadithgw::services::usage::spawn_hourly_sweep;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Load provider chain from JSON file (required)
    let app_config = AppConfig::load_default().context("Failed to load provider configuration")?;

    info!("Provider configuration loaded");

    // Load runtime settings from environment (admission, counter store, logging)
    let settings = Settings::new().context("Failed to load server settings")?;
    info!("Server settings loaded");

    // Build server address before the config moves into the state
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);

    let state = build_state(settings, app_config).await?;

    // Usage counters reset on a fixed timer, independent of traffic
    spawn_hourly_sweep(state.usage.clone(), state.clock.clone());

    let app = router_with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Hadith gateway started!");
    info!("Health check: http://{}/health", addr);
    info!("Chat endpoint: http://{}/v1/chat", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}

/// Initialize logging system
fn init_logging() {
    // Get log level from environment variable, default to info
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    // Check if JSON format should be used
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if log_format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging system initialized");
}
