//! Cloud Translation v2 后端测试
//!
//! 使用本地脚本化 HTTP 服务验证请求格式、重试次数和错误归类。

use std::sync::Arc;

use google_translator::{
    CloudTranslator, NetworkErrorKind, RetryConfig, TranslationConfig, TranslationError,
    TranslationLibConfig, TranslationRequest, TranslationService, GOOGLE_BACKEND,
};
use reqwest::Client;
use tokio_test::{assert_err, assert_ok};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{closed_port_url, RecordingProgress, ScriptedServer};

const OK_BODY: &str =
    r#"{"data":{"translations":[{"translatedText":"你好","detectedSourceLanguage":"en"}]}}"#;

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_delay_ms: 1,
        max_delay_ms: 1,
        backoff_multiplier: 1.0,
    }
}

fn translator_for(url: &str) -> CloudTranslator {
    let config = TranslationConfig {
        api_url: url.to_string(),
        request_timeout_secs: 5,
        ..TranslationConfig::default()
    };
    let client = Client::builder().no_proxy().build().unwrap();
    CloudTranslator::new(client, &config, fast_retry(), "test-key")
}

#[tokio::test]
async fn sends_single_element_batch_with_key() {
    let server = ScriptedServer::start(vec![(200, OK_BODY)]).await;
    let translator = translator_for(&server.url);

    let result = assert_ok!(
        translator
            .call_chunk("Hello", "test-key", "auto", "zh", 2)
            .await
    );
    assert_eq!(result.text, "你好");
    assert_eq!(result.detected_source.as_deref(), Some("en"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].request_line.starts_with("POST "));
    assert!(requests[0].request_line.contains("key=test-key"));
    assert_eq!(
        requests[0].json(),
        serde_json::json!({"q": ["Hello"], "target": "zh-CN", "format": "text"})
    );
}

#[tokio::test]
async fn explicit_source_is_sent() {
    let server = ScriptedServer::start(vec![(200, OK_BODY)]).await;
    let translator = translator_for(&server.url);

    assert_ok!(translator.call_chunk("Hello", "k", "en", "ja", 1).await);
    let body = server.requests()[0].json();
    assert_eq!(body["source"], "en");
    assert_eq!(body["target"], "ja");
}

#[tokio::test]
async fn fail_twice_then_succeed_respects_attempt_budget() {
    let script = vec![
        (503, r#"{"error":{"message":"busy"}}"#),
        (503, r#"{"error":{"message":"busy"}}"#),
        (200, OK_BODY),
    ];

    let server = ScriptedServer::start(script.clone()).await;
    let err = assert_err!(
        translator_for(&server.url)
            .call_chunk("Hello", "k", "auto", "zh", 2)
            .await
    );
    assert!(matches!(err, TranslationError::Backend { status: Some(503), .. }));
    assert_eq!(server.requests().len(), 2);

    let server = ScriptedServer::start(script).await;
    let result = assert_ok!(
        translator_for(&server.url)
            .call_chunk("Hello", "k", "auto", "zh", 3)
            .await
    );
    assert_eq!(result.text, "你好");
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn final_error_uses_structured_message() {
    let server =
        ScriptedServer::start(vec![(400, r#"{"error":{"code":400,"message":"API key not valid"}}"#)])
            .await;
    let err = assert_err!(
        translator_for(&server.url)
            .call_chunk("Hello", "bad", "auto", "zh", 2)
            .await
    );
    match err {
        TranslationError::Backend { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "API key not valid");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn final_error_falls_back_to_raw_body() {
    let server = ScriptedServer::start(vec![(502, "bad gateway")]).await;
    let err = assert_err!(
        translator_for(&server.url)
            .call_chunk("Hello", "k", "auto", "zh", 1)
            .await
    );
    assert_eq!(
        err.to_string(),
        "Google 翻译: 请求失败 (502) bad gateway"
    );
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn empty_success_is_not_retried() {
    let server = ScriptedServer::start(vec![(200, r#"{"data":{"translations":[]}}"#)]).await;
    let err = assert_err!(
        translator_for(&server.url)
            .call_chunk("Hello", "k", "auto", "zh", 3)
            .await
    );
    assert!(matches!(err, TranslationError::EmptyResult(_)));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn connection_failure_is_categorized() {
    let url = closed_port_url().await;
    let err = assert_err!(
        translator_for(&url)
            .call_chunk("Hello", "k", "auto", "zh", 2)
            .await
    );
    match &err {
        TranslationError::Network { kind, .. } => assert_eq!(*kind, NetworkErrorKind::Connection),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("连接失败"));
}

#[tokio::test]
async fn service_uses_cloud_backend_when_key_is_configured() {
    let server = ScriptedServer::start(vec![(200, OK_BODY)]).await;

    let mut config = TranslationLibConfig::with_google_api_key("svc-key");
    config.translation.api_url = server.url.clone();
    config.retry = fast_retry();
    assert!(config.backends.contains_key(GOOGLE_BACKEND));

    let progress = Arc::new(RecordingProgress::default());
    let service = TranslationService::new(config).with_progress_sink(progress.clone());

    let result = service
        .translate(TranslationRequest::new("Hello", "zh"))
        .await;
    assert!(result.success, "{:?}", result.error);
    let data = result.data.unwrap();
    assert_eq!(data.translated, "你好");
    assert_eq!(data.from, "en");
    assert_eq!(data.to, "zh");
    assert_eq!(data.original, "Hello");

    assert!(server.requests()[0].request_line.contains("key=svc-key"));
    assert_eq!(progress.events().len(), 2);
}
