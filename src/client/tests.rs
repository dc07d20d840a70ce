// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;
use crate::testkit::{StubResponse, StubTransport};
use crate::ProgressOptions;

const JOB_KEY: &str = "abc123de";

const SUCCESS_BODY: &str = r#"{"status":"success","message":"OK","action":"ping","job_key":"abc123de","timestamp":"2026-02-25 12:00:00","processing_time_ms":8.25}"#;

fn test_config() -> CronbeatsClientConfig {
    CronbeatsClientConfig {
        max_retries: 0,
        retry_backoff: Duration::from_millis(1),
        retry_jitter: Duration::ZERO,
        ..Default::default()
    }
}

fn test_client(
    transport: Arc<StubTransport>,
    config: CronbeatsClientConfig,
) -> CronbeatsClient {
    CronbeatsClient::with_transport(JOB_KEY, config, transport).expect("failed to create client")
}

#[test]
fn test_invalid_job_keys_rejected() {
    for key in ["invalid-key", "abc123d", "abc123def", "", "abc 23de", "abc123d!"] {
        let result = CronbeatsClient::with_transport(
            key,
            test_config(),
            Arc::new(StubTransport::new()),
        );
        assert!(
            matches!(result, Err(CronbeatsError::Validation(_))),
            "key {key:?} should be rejected"
        );
    }
}

#[test]
fn test_valid_job_keys_accepted() {
    for key in ["abc123de", "ABC123DE", "12345678", "aaaaaaaa"] {
        let result = CronbeatsClient::with_transport(
            key,
            test_config(),
            Arc::new(StubTransport::new()),
        );
        assert!(result.is_ok(), "key {key:?} should be accepted");
    }
}

#[test]
fn test_default_config() {
    let config = CronbeatsClientConfig::default();
    assert_eq!(config.base_url, "https://cronbeats.io");
    assert_eq!(config.timeout, Duration::from_millis(5000));
    assert_eq!(config.max_retries, 2);
    assert_eq!(config.retry_backoff, Duration::from_millis(250));
    assert_eq!(config.retry_jitter, Duration::from_millis(100));
    assert!(config.user_agent.starts_with("cronbeats-rs-sdk/"));
}

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let transport = Arc::new(StubTransport::new());
    let config = CronbeatsClientConfig {
        base_url: "https://cronbeats.example/".to_string(),
        ..test_config()
    };
    let client = test_client(transport, config);
    assert_eq!(client.base_url(), "https://cronbeats.example");
}

#[test]
fn test_invalid_base_url_rejected() {
    let result = CronbeatsClient::with_transport(
        JOB_KEY,
        CronbeatsClientConfig {
            base_url: "not a url".to_string(),
            ..test_config()
        },
        Arc::new(StubTransport::new()),
    );
    assert!(matches!(result, Err(CronbeatsError::Validation(_))));
}

#[test]
fn test_invalid_user_agent_rejected() {
    let result = CronbeatsClient::with_transport(
        JOB_KEY,
        CronbeatsClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..test_config()
        },
        Arc::new(StubTransport::new()),
    );
    assert!(matches!(result, Err(CronbeatsError::Validation(_))));
}

#[tokio::test]
async fn test_ping_success_normalized() {
    let transport = Arc::new(StubTransport::with_responses([StubResponse::new(
        200,
        SUCCESS_BODY,
    )]));
    let client = test_client(transport.clone(), test_config());

    let result = client.ping().await.expect("ping should succeed");
    assert!(result.ok);
    assert_eq!(result.action, "ping");
    assert_eq!(result.job_key, "abc123de");
    assert_eq!(result.timestamp, "2026-02-25 12:00:00");
    assert_eq!(result.processing_time_ms, 8.25);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::POST);
    assert_eq!(calls[0].url, "https://cronbeats.io/ping/abc123de");
    assert!(calls[0].body.is_none());
}

#[tokio::test]
async fn test_request_headers() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    client.ping().await.expect("ping should succeed");

    let calls = transport.calls();
    let headers = &calls[0].headers;
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    let agent = headers.get(USER_AGENT).unwrap().to_str().unwrap();
    assert!(agent.starts_with("cronbeats-rs-sdk/"));
}

#[tokio::test]
async fn test_start_path() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    client.start().await.expect("start should succeed");
    assert_eq!(
        transport.calls()[0].url,
        "https://cronbeats.io/ping/abc123de/start"
    );
}

#[tokio::test]
async fn test_end_rejects_unknown_status() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    let err = client.end("done").await.unwrap_err();
    assert!(matches!(err, CronbeatsError::Validation(_)));
    assert_eq!(transport.call_count(), 0, "no network call should be made");
}

#[tokio::test]
async fn test_end_normalizes_status() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    client.end("").await.expect("empty status defaults");
    client.end("  FAIL \n").await.expect("status is normalized");

    let calls = transport.calls();
    assert_eq!(calls[0].url, "https://cronbeats.io/ping/abc123de/end/success");
    assert_eq!(calls[1].url, "https://cronbeats.io/ping/abc123de/end/fail");
}

#[tokio::test]
async fn test_success_and_fail_wrappers() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    client.success().await.expect("success should succeed");
    client.fail().await.expect("fail should succeed");

    let calls = transport.calls();
    assert_eq!(calls[0].url, "https://cronbeats.io/ping/abc123de/end/success");
    assert_eq!(calls[1].url, "https://cronbeats.io/ping/abc123de/end/fail");
}

#[tokio::test]
async fn test_progress_rejects_negative_seq() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    let err = client.progress(-1).await.unwrap_err();
    assert!(matches!(err, CronbeatsError::Validation(_)));
    assert_eq!(transport.call_count(), 0, "no network call should be made");
}

#[tokio::test]
async fn test_progress_without_seq() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    client.progress(()).await.expect("progress should succeed");

    let calls = transport.calls();
    assert_eq!(calls[0].url, "https://cronbeats.io/ping/abc123de/progress");
    assert_eq!(calls[0].body.as_deref(), Some(r#"{"message":""}"#));
}

#[tokio::test]
async fn test_progress_truncation_and_seq_path() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    client
        .progress(ProgressOptions::new().seq(50).message("x".repeat(300)))
        .await
        .expect("progress should succeed");

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].url,
        "https://cronbeats.io/ping/abc123de/progress/50"
    );

    let sent: Value =
        serde_json::from_str(calls[0].body.as_deref().unwrap()).expect("body is JSON");
    let message = sent["message"].as_str().unwrap();
    assert_eq!(message.chars().count(), 255);
}

#[tokio::test]
async fn test_progress_message_only() {
    let transport = Arc::new(StubTransport::new());
    let client = test_client(transport.clone(), test_config());

    client
        .progress("halfway there")
        .await
        .expect("progress should succeed");

    let calls = transport.calls();
    assert_eq!(calls[0].url, "https://cronbeats.io/ping/abc123de/progress");
    assert_eq!(
        calls[0].body.as_deref(),
        Some(r#"{"message":"halfway there"}"#)
    );
}

#[tokio::test]
async fn test_retry_on_network_failure_then_success() {
    let transport = Arc::new(StubTransport::with_responses([StubResponse::new(
        200,
        SUCCESS_BODY,
    )]));
    transport.fail_times(2);
    let client = test_client(
        transport.clone(),
        CronbeatsClientConfig {
            max_retries: 2,
            ..test_config()
        },
    );

    let result = client.ping().await.expect("retries should recover");
    assert!(result.ok);
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_network_failures_exhaust_budget() {
    let transport = Arc::new(StubTransport::new());
    transport.fail_times(3);
    let client = test_client(
        transport.clone(),
        CronbeatsClientConfig {
            max_retries: 2,
            ..test_config()
        },
    );

    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, CronbeatsError::Network(_)));
    assert!(err.is_retryable());
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_retry_on_429_then_success() {
    let transport = Arc::new(StubTransport::with_responses([
        StubResponse::new(429, r#"{"status":"error","message":"Too many requests"}"#),
        StubResponse::new(200, SUCCESS_BODY),
    ]));
    let client = test_client(
        transport.clone(),
        CronbeatsClientConfig {
            max_retries: 2,
            ..test_config()
        },
    );

    let result = client.ping().await.expect("429 should be retried");
    assert!(result.ok);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_no_retry_on_400() {
    let transport = Arc::new(StubTransport::with_responses([StubResponse::new(
        400,
        r#"{"status":"error","message":"Invalid request"}"#,
    )]));
    let client = test_client(
        transport.clone(),
        CronbeatsClientConfig {
            max_retries: 2,
            ..test_config()
        },
    );

    let err = client.ping().await.unwrap_err();
    match err {
        CronbeatsError::Api(api) => {
            assert_eq!(api.code, ApiErrorCode::Validation);
            assert!(!api.retryable);
            assert_eq!(api.message, "Invalid request");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_404_maps_to_not_found() {
    let transport = Arc::new(StubTransport::with_responses([StubResponse::new(
        404,
        r#"{"status":"error","message":"Job not found"}"#,
    )]));
    let client = test_client(transport.clone(), test_config());

    let err = client.ping().await.unwrap_err();
    match err {
        CronbeatsError::Api(api) => {
            assert_eq!(api.code, ApiErrorCode::NotFound);
            assert_eq!(api.status.as_u16(), 404);
            assert!(!api.retryable);
            assert_eq!(api.message, "Job not found");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_errors_retried_until_exhausted() {
    let transport = Arc::new(StubTransport::with_responses([
        StubResponse::new(500, r#"{"status":"error","message":"Internal error"}"#),
        StubResponse::new(503, r#"{"status":"error","message":"Unavailable"}"#),
    ]));
    let client = test_client(
        transport.clone(),
        CronbeatsClientConfig {
            max_retries: 1,
            ..test_config()
        },
    );

    let err = client.ping().await.unwrap_err();
    match err {
        CronbeatsError::Api(api) => {
            assert_eq!(api.code, ApiErrorCode::Server);
            assert!(api.retryable);
            assert_eq!(api.status.as_u16(), 503);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_zero_max_retries_means_single_attempt() {
    let transport = Arc::new(StubTransport::with_responses([StubResponse::new(
        429,
        r#"{"status":"error","message":"Too many requests"}"#,
    )]));
    let client = test_client(transport.clone(), test_config());

    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, CronbeatsError::Api(_)));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_invalid_json_in_2xx_body_still_succeeds() {
    let transport = Arc::new(StubTransport::with_responses([StubResponse::new(
        200,
        "<html>not json</html>",
    )]));
    let client = test_client(transport, test_config());

    let result = client.ping().await.expect("2xx is success regardless of body");
    assert!(result.ok);
    assert_eq!(result.action, "ping");
    assert_eq!(result.job_key, "abc123de");
    assert_eq!(
        result.raw.get("message").and_then(Value::as_str),
        Some("Invalid JSON response")
    );
}

#[tokio::test]
async fn test_error_message_falls_back_when_body_unusable() {
    let transport = Arc::new(StubTransport::with_responses([
        StubResponse::new(400, "<html>not json</html>"),
        StubResponse::new(400, r#"{"status":"error"}"#),
    ]));
    let client = test_client(transport, test_config());

    // Non-JSON body carries the fallback object, whose message is the
    // decode marker.
    let err = client.ping().await.unwrap_err();
    match err {
        CronbeatsError::Api(api) => assert_eq!(api.message, "Invalid JSON response"),
        other => panic!("expected Api error, got {other:?}"),
    }

    // JSON body without a message field falls back to the generic text.
    let err = client.ping().await.unwrap_err();
    match err {
        CronbeatsError::Api(api) => assert_eq!(api.message, "Request failed"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_object_body_falls_back_to_client_state() {
    let transport = Arc::new(StubTransport::with_responses([StubResponse::new(
        200, "{}",
    )]));
    let client = test_client(transport, test_config());

    let result = client.ping().await.expect("ping should succeed");
    assert!(result.ok);
    assert_eq!(result.action, "ping");
    assert_eq!(result.job_key, "abc123de");
    assert_eq!(result.processing_time_ms, 0.0);
    assert!(result.next_expected.is_none());
}
