//! Chat endpoint handler

use crate::handlers::AppState;
use crate::models::chat::{ChatReply, ChatRequest};
use crate::services::admission::AdmissionDecision;
use crate::services::sanitizer::sanitize;
use crate::utils::error::AppError;
use crate::utils::logging::create_chat_log_summary;
use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;
use tracing::debug;

const CALLER_HEADER: &str = "x-caller-id";
const ANONYMOUS_CALLER: &str = "anonymous";

/// Caller identity from the request headers
///
/// Missing, empty, or non-UTF-8 values collapse to the shared anonymous
/// bucket rather than being rejected.
fn caller_id(headers: &HeaderMap) -> String {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(ANONYMOUS_CALLER)
        .to_string()
}

fn validate_chat_request(request: &ChatRequest) -> Result<(), AppError> {
    if request.messages.is_empty() {
        return Err(AppError::Validation(
            "messages cannot be empty".to_string(),
        ));
    }

    for message in &request.messages {
        if message.content.trim().is_empty() {
            return Err(AppError::Validation(
                "message content cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Handle a chat turn: admit, dispatch through the provider chain, sanitize
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let caller = caller_id(&headers);

    debug!(
        "Chat request: {}",
        create_chat_log_summary(&request, &caller)
    );

    validate_chat_request(&request)?;

    match state.admission.check(&caller, state.clock.now()).await? {
        AdmissionDecision::Allowed { .. } => {}
        AdmissionDecision::Rejected { reset_at } => {
            return Err(AppError::AdmissionRejected { reset_at });
        }
    }

    let messages = request.into_dispatch_messages();
    let reply = state.orchestrator.send(messages).await?;

    Ok(Json(ChatReply {
        response: sanitize(&reply),
    }))
}
