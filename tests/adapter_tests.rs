//! Provider adapter wire-format tests
//!
//! Pin each adapter's request shape and response handling against a mock
//! upstream server.

use hadithgw::config::{ProviderConfig, WireFamily};
use hadithgw::models::chat::ChatMessage;
use hadithgw::providers::{GoogleAdapter, OpenAiAdapter, ProviderAdapter};
use hadithgw::services::classifier::{classify, ErrorKind};
use httpmock::prelude::*;

fn openai_provider(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        name: "openai-test".to_string(),
        family: WireFamily::OpenAi,
        base_url: base_url.to_string(),
        api_key: "sk-test".to_string(),
        model: "gpt-4o-mini".to_string(),
        daily_quota: 100,
        timeout_secs: 5,
    }
}

fn google_provider(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        name: "gemini-test".to_string(),
        family: WireFamily::Google,
        base_url: base_url.to_string(),
        api_key: "test-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
        daily_quota: 100,
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_openai_adapter_sends_bearer_auth_and_extracts_reply() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_contains("\"model\":\"gpt-4o-mini\"")
                .body_contains("\"role\":\"user\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "الجواب هنا"}}]
                }));
        })
        .await;

    let adapter = OpenAiAdapter::new().unwrap();
    let provider = openai_provider(&server.base_url());
    let messages = vec![ChatMessage::user("ما معنى هذا الحديث؟")];

    let reply = adapter.dispatch(&provider, &messages).await.unwrap();

    mock.assert_async().await;
    assert_eq!(reply, "الجواب هنا");
}

#[tokio::test]
async fn test_openai_adapter_returns_empty_on_schema_drift() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"unexpected": "shape"}));
        })
        .await;

    let adapter = OpenAiAdapter::new().unwrap();
    let provider = openai_provider(&server.base_url());
    let messages = vec![ChatMessage::user("سؤال")];

    let reply = adapter.dispatch(&provider, &messages).await.unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_openai_adapter_preserves_upstream_status() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"error": {"message": "Rate limit reached"}}));
        })
        .await;

    let adapter = OpenAiAdapter::new().unwrap();
    let provider = openai_provider(&server.base_url());
    let messages = vec![ChatMessage::user("سؤال")];

    let err = adapter.dispatch(&provider, &messages).await.unwrap_err();

    assert_eq!(err.status, Some(429));
    assert_eq!(classify(&err), ErrorKind::RateLimit);
}

#[tokio::test]
async fn test_google_adapter_sends_key_as_query_param_and_remaps_roles() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-1.5-flash:generateContent")
                .query_param("key", "test-key")
                .body_contains("\"role\":\"model\"")
                .body_contains("\"role\":\"user\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "candidates": [{"content": {"role": "model", "parts": [{"text": "شرح الحديث"}]}}]
                }));
        })
        .await;

    let adapter = GoogleAdapter::new().unwrap();
    let provider = google_provider(&server.base_url());
    let messages = vec![
        ChatMessage::user("ما معنى هذا الحديث؟"),
        ChatMessage::assistant("جواب سابق"),
        ChatMessage::user("وضح أكثر"),
    ];

    let reply = adapter.dispatch(&provider, &messages).await.unwrap();

    mock.assert_async().await;
    assert_eq!(reply, "شرح الحديث");
}

#[tokio::test]
async fn test_google_adapter_returns_empty_on_schema_drift() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-1.5-flash:generateContent");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"candidates": []}));
        })
        .await;

    let adapter = GoogleAdapter::new().unwrap();
    let provider = google_provider(&server.base_url());
    let messages = vec![ChatMessage::user("سؤال")];

    let reply = adapter.dispatch(&provider, &messages).await.unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_google_adapter_surfaces_quota_status() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-1.5-flash:generateContent");
            then.status(403)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"error": {"message": "Quota exceeded"}}));
        })
        .await;

    let adapter = GoogleAdapter::new().unwrap();
    let provider = google_provider(&server.base_url());
    let messages = vec![ChatMessage::user("سؤال")];

    let err = adapter.dispatch(&provider, &messages).await.unwrap_err();

    assert_eq!(err.status, Some(403));
    assert_eq!(classify(&err), ErrorKind::QuotaExceeded);
}

#[tokio::test]
async fn test_refused_connection_classifies_as_network() {
    // Bind and drop a listener so the port is closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let adapter = OpenAiAdapter::new().unwrap();
    let provider = openai_provider(&format!("http://127.0.0.1:{}", port));
    let messages = vec![ChatMessage::user("سؤال")];

    let err = adapter.dispatch(&provider, &messages).await.unwrap_err();

    assert!(err.status.is_none());
    assert_eq!(classify(&err), ErrorKind::Network);
}
