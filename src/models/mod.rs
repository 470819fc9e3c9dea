//! Data models module
//!
//! Defines request and response data structures for the chat API

pub mod chat;

pub use chat::{ChatContext, ChatMessage, ChatReply, ChatRequest, Role};
