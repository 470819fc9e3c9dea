//! Integration tests
//!
//! Test end-to-end behavior of the HTTP surface with scripted providers and
//! in-process admission counters.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use hadithgw::config::{AdmissionSettings, ProviderConfig, Settings, WireFamily};
use hadithgw::config::settings::LoggingConfig;
use hadithgw::handlers::{router_with_state, AppState};
use hadithgw::models::chat::ChatMessage;
use hadithgw::providers::{ProviderAdapter, ProviderError, ProviderRegistry};
use hadithgw::services::admission::{AdmissionController, MemoryCounterStore};
use hadithgw::services::orchestrator::Orchestrator;
use hadithgw::services::usage::UsageTracker;
use hadithgw::utils::clock::{Clock, SystemClock};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Adapter that replays a scripted sequence of results
struct ScriptedAdapter {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
}

impl ScriptedAdapter {
    fn new(script: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn family(&self) -> WireFamily {
        WireFamily::OpenAi
    }

    async fn dispatch(
        &self,
        _provider: &ProviderConfig,
        _messages: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("adapter script exhausted")
    }
}

fn test_provider(name: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        family: WireFamily::OpenAi,
        base_url: "https://api.example.com".to_string(),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        daily_quota: 100,
        timeout_secs: 30,
    }
}

fn test_settings(quota: u64) -> Settings {
    Settings {
        admission: AdmissionSettings {
            daily_quota: quota,
            exempt_caller: None,
        },
        redis_url: None,
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "text".to_string(),
        },
    }
}

/// Build application state around scripted adapters
fn test_state(replies: Vec<Result<String, ProviderError>>, quota: u64) -> Arc<AppState> {
    let adapter = ScriptedAdapter::new(replies);
    let registry = ProviderRegistry::with_adapters(vec![(
        test_provider("scripted"),
        adapter as Arc<dyn ProviderAdapter>,
    )]);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let usage = Arc::new(UsageTracker::new());
    let orchestrator = Orchestrator::new(registry, Arc::clone(&usage), Arc::clone(&clock));
    let admission =
        AdmissionController::new(Arc::new(MemoryCounterStore::new()), quota, None);

    Arc::new(AppState {
        settings: test_settings(quota),
        admission,
        orchestrator,
        usage,
        clock,
    })
}

fn chat_request(caller: &str, content: &str) -> Request<Body> {
    let body = serde_json::json!({
        "messages": [{"role": "user", "content": content}]
    });

    Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("x-caller-id", caller)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = router_with_state(test_state(vec![], 15));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "hadithgw");
    assert_eq!(health["details"]["providers_total"], 1);
    assert_eq!(health["details"]["providers_available"], 1);
    assert!(health["version"].is_string());
}

#[tokio::test]
async fn test_health_degrades_with_body_when_no_provider_available() {
    let state = test_state(vec![], 15);

    // Trip the breaker on the only provider
    for _ in 0..3 {
        state.usage.record_failure("scripted", state.clock.now());
    }

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router_with_state(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // The 503 still carries the full health body
    let health = body_json(response).await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["details"]["providers_total"], 1);
    assert_eq!(health["details"]["providers_available"], 0);
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let app = router_with_state(test_state(vec![], 15));

    let request = Request::builder()
        .uri("/health/live")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "alive");
}

#[tokio::test]
async fn test_chat_returns_sanitized_reply() {
    // The bracketed aside and the Latin text are stripped before the reply
    // reaches the caller
    let app = router_with_state(test_state(
        vec![Ok("[EN] إنما الأعمال بالنيات".to_string())],
        15,
    ));

    let response = app
        .oneshot(chat_request("student-1", "ما معنى هذا الحديث؟"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["response"], "إنما الأعمال بالنيات");
}

#[tokio::test]
async fn test_chat_rejects_empty_messages() {
    let app = router_with_state(test_state(vec![], 15));

    let body = serde_json::json!({"messages": []});
    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_admission_quota_rejects_with_reset_time() {
    let state = test_state(
        vec![Ok("الجواب الأول".to_string()), Ok("الجواب الثاني".to_string())],
        1,
    );

    let first = router_with_state(state.clone())
        .oneshot(chat_request("student-1", "سؤال أول"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router_with_state(state)
        .oneshot(chat_request("student-1", "سؤال ثانٍ"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = body_json(second).await;
    assert_eq!(body["type"], "rate_limit_error");
    assert!(body["resetTime"].is_string());
    // Caller-facing text is localized, without raw upstream detail
    assert!(body["error"].as_str().unwrap().contains("الحد اليومي"));
}

#[tokio::test]
async fn test_upstream_failure_returns_generic_message() {
    let app = router_with_state(test_state(
        vec![Err(ProviderError::http(404, "secret internal detail"))],
        15,
    ));

    let response = app
        .oneshot(chat_request("student-1", "سؤال"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("secret internal detail"));
    assert!(!message.contains("404"));
}
