//! Logging utilities
//!
//! Helpers for compact request summaries in debug logs.

use crate::models::chat::{ChatRequest, Role};

/// Truncate a string with a note about original length
fn truncate_content(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len).collect();
        format!("{}... ({} chars total)", truncated, s.chars().count())
    } else {
        s.to_string()
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Create a compact summary of a chat request for logging
///
/// Only the current turn's text is included, truncated; earlier history is
/// summarized by count.
pub fn create_chat_log_summary(request: &ChatRequest, caller_id: &str) -> serde_json::Value {
    let last_turn = request.messages.last().map(|m| {
        serde_json::json!({
            "role": role_name(m.role),
            "content": truncate_content(&m.content, 120),
        })
    });

    serde_json::json!({
        "caller": caller_id,
        "messages": request.messages.len(),
        "has_context": request.context.as_ref().map(|c| !c.is_empty()).unwrap_or(false),
        "last_turn": last_turn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ChatContext, ChatMessage};

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("short", 10), "short");

        let long = "x".repeat(200);
        let truncated = truncate_content(&long, 50);
        assert!(truncated.starts_with(&"x".repeat(50)));
        assert!(truncated.contains("200 chars total"));
    }

    #[test]
    fn test_summary_shape() {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::user("سؤال أول"),
                ChatMessage::assistant("جواب"),
                ChatMessage::user("سؤال ثانٍ"),
            ],
            context: Some(ChatContext {
                text: Some("حديث".to_string()),
                ..Default::default()
            }),
        };

        let summary = create_chat_log_summary(&request, "user-42");
        assert_eq!(summary["caller"], "user-42");
        assert_eq!(summary["messages"], 3);
        assert_eq!(summary["has_context"], true);
        assert_eq!(summary["last_turn"]["role"], "user");
    }
}
