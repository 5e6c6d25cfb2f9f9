use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use emmaus::config::llm::{ApiCredential, LlmConfig, RetryPolicy};
use emmaus::services::llm::{LlmClient, LlmError};

/// Stand-in for the upstream chat API: replays a fixed response sequence
/// (clamping to the last entry) and records what it was sent.
#[derive(Clone)]
struct Upstream {
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<Value>>>,
    responses: Arc<Vec<(u16, Value)>>,
}

async fn completions(
    State(upstream): State<Upstream>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let hit = upstream.hits.fetch_add(1, Ordering::SeqCst);
    *upstream.last_request.lock().unwrap() = Some(body);

    let index = hit.min(upstream.responses.len() - 1);
    let (status, body) = upstream.responses[index].clone();

    (StatusCode::from_u16(status).unwrap(), Json(body))
}

async fn spawn_upstream(responses: Vec<(u16, Value)>) -> (String, Upstream) {
    let upstream = Upstream {
        hits: Arc::new(AtomicUsize::new(0)),
        last_request: Arc::new(Mutex::new(None)),
        responses: Arc::new(responses),
    };

    let app = Router::new()
        .route("/chat/completions", post(completions))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), upstream)
}

fn test_config(base_url: String, backoff_ms: u64) -> LlmConfig {
    LlmConfig {
        base_url,
        model: "test-model".to_string(),
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(backoff_ms),
        },
        credential: ApiCredential::from_key("test-key"),
    }
}

fn success_body(content: &str) -> Value {
    json!({ "choices": [ { "message": { "content": content } } ] })
}

fn rate_limit_body() -> Value {
    json!({ "error": { "code": 429, "message": "Rate limit reached" } })
}

#[tokio::test]
async fn returns_first_choice_content_on_success() {
    let (base_url, upstream) =
        spawn_upstream(vec![(200, success_body(r#"{"path":{"days":[]}}"#))]).await;
    let client = LlmClient::new(test_config(base_url, 10)).unwrap();

    let content = client.chat_json("prompt").await.unwrap();

    assert_eq!(content, r#"{"path":{"days":[]}}"#);
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn chat_json_requests_a_json_object() {
    let (base_url, upstream) = spawn_upstream(vec![(200, success_body("{\"a\":1}"))]).await;
    let client = LlmClient::new(test_config(base_url, 10)).unwrap();

    client.chat_json("the prompt").await.unwrap();

    let request = upstream.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request["model"], "test-model");
    assert_eq!(request["messages"][0]["role"], "user");
    assert_eq!(request["messages"][0]["content"], "the prompt");
    assert_eq!(request["response_format"]["type"], "json_object");
}

#[tokio::test]
async fn chat_text_omits_response_format() {
    let (base_url, upstream) =
        spawn_upstream(vec![(200, success_body("a pastoral answer"))]).await;
    let client = LlmClient::new(test_config(base_url, 10)).unwrap();

    let answer = client.chat_text("question").await.unwrap();

    assert_eq!(answer, "a pastoral answer");
    let request = upstream.last_request.lock().unwrap().clone().unwrap();
    assert!(request.get("response_format").is_none());
}

#[tokio::test]
async fn retries_rate_limit_envelope_then_succeeds() {
    let (base_url, upstream) = spawn_upstream(vec![
        (200, rate_limit_body()),
        (200, rate_limit_body()),
        (200, success_body("{\"ok\":true}")),
    ])
    .await;
    let client = LlmClient::new(test_config(base_url, 20)).unwrap();

    let content = client.chat_json("prompt").await.unwrap();

    assert_eq!(content, "{\"ok\":true}");
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retries_http_429_status() {
    let (base_url, upstream) = spawn_upstream(vec![
        (429, rate_limit_body()),
        (200, success_body("{\"ok\":true}")),
    ])
    .await;
    let client = LlmClient::new(test_config(base_url, 20)).unwrap();

    let content = client.chat_json("prompt").await.unwrap();

    assert_eq!(content, "{\"ok\":true}");
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn surfaces_last_rate_limit_error_after_exhaustion() {
    let (base_url, upstream) = spawn_upstream(vec![(200, rate_limit_body())]).await;
    let client = LlmClient::new(test_config(base_url, 20)).unwrap();

    let err = client.chat_json("prompt").await.unwrap_err();

    match err {
        LlmError::MaxRetriesExceeded { attempts, last } => {
            assert_eq!(attempts, 3);
            assert_eq!(last, "Rate limit reached");
        }
        other => panic!("expected MaxRetriesExceeded, got {other:?}"),
    }
    // exactly three requests, no more
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn attempts_are_backoff_spaced() {
    let (base_url, _upstream) = spawn_upstream(vec![(200, rate_limit_body())]).await;
    let client = LlmClient::new(test_config(base_url, 200)).unwrap();

    let start = Instant::now();
    let _ = client.chat_json("prompt").await;

    // two sleeps between three attempts
    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn api_errors_are_not_retried() {
    let (base_url, upstream) = spawn_upstream(vec![(
        200,
        json!({ "error": { "code": 500, "message": "model overloaded" } }),
    )])
    .await;
    let client = LlmClient::new(test_config(base_url, 10)).unwrap();

    let err = client.chat_json("prompt").await.unwrap_err();

    match err {
        LlmError::ApiError(message) => assert_eq!(message, "model overloaded"),
        other => panic!("expected ApiError, got {other:?}"),
    }
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn single_attempt_calls_do_not_retry() {
    let (base_url, upstream) = spawn_upstream(vec![(200, rate_limit_body())]).await;
    let client = LlmClient::new(test_config(base_url, 10)).unwrap();

    let err = client.chat_json_once("prompt").await.unwrap_err();

    assert!(matches!(err, LlmError::RateLimitExceeded(_)));
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_object_body_is_invalid_response() {
    let (base_url, upstream) = spawn_upstream(vec![(200, json!("not an object"))]).await;
    let client = LlmClient::new(test_config(base_url, 10)).unwrap();

    let err = client.chat_json("prompt").await.unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse(_)));
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_choices_is_invalid_response() {
    let (base_url, _upstream) = spawn_upstream(vec![(200, json!({ "choices": [] }))]).await;
    let client = LlmClient::new(test_config(base_url, 10)).unwrap();

    let err = client.chat_json("prompt").await.unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn blank_content_is_invalid_response() {
    let (base_url, _upstream) = spawn_upstream(vec![(200, success_body("   "))]).await;
    let client = LlmClient::new(test_config(base_url, 10)).unwrap();

    let err = client.chat_json("prompt").await.unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse(_)));
}

#[test]
fn unconfigured_credential_is_rejected() {
    let mut config = test_config("http://localhost".to_string(), 10);
    config.credential = ApiCredential::from_key("");

    assert!(matches!(
        LlmClient::new(config),
        Err(LlmError::MissingApiKey)
    ));
}
