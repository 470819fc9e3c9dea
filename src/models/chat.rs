//! Chat message types
//!
//! Wire types shared by the inbound API and the provider adapters

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message; the last message of a request is the current turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Structured hadith context attached to a chat request
///
/// Folded into a system message ahead of the conversation so every provider
/// receives the same framing regardless of wire family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatContext {
    /// Hadith text under discussion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Narrator attribution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,

    /// Source collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Authenticity grading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grading: Option<String>,
}

impl ChatContext {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.attribution.is_none()
            && self.source.is_none()
            && self.grading.is_none()
    }

    /// Render the context as a system prompt body
    pub fn to_system_prompt(&self) -> String {
        let mut lines = vec![
            "You are a knowledgeable assistant explaining hadiths to learners. \
             Answer in Arabic, staying faithful to the hadith under discussion."
                .to_string(),
        ];

        if let Some(text) = &self.text {
            lines.push(format!("Hadith: {}", text));
        }
        if let Some(attribution) = &self.attribution {
            lines.push(format!("Narrator: {}", attribution));
        }
        if let Some(source) = &self.source {
            lines.push(format!("Source: {}", source));
        }
        if let Some(grading) = &self.grading {
            lines.push(format!("Grading: {}", grading));
        }

        lines.join("\n")
    }
}

/// Inbound chat request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ChatContext>,
}

impl ChatRequest {
    /// Produce the message list handed to the orchestrator, with any context
    /// folded into a prepended system message
    pub fn into_dispatch_messages(self) -> Vec<ChatMessage> {
        let mut messages = self.messages;

        if let Some(context) = self.context {
            if !context.is_empty() {
                messages.insert(0, ChatMessage::system(context.to_system_prompt()));
            }
        }

        messages
    }
}

/// Successful chat reply
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}
