//! Google Cloud Translation v2 后端

use super::ChunkTranslator;
use crate::error::{Result, TranslationError};
use crate::lang;
use crate::translator::retry_with_backoff;
use crate::types::{
    ChunkTranslation, CloudErrorResponse, CloudTranslateRequest, CloudTranslateResponse,
    RetryConfig, TranslationConfig,
};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Cloud Translation v2 客户端
///
/// 请求格式：`POST {api_url}?key=<api_key>`，请求体
/// `{"q": [text], "target": <lang>, "format": "text", "source"?: <lang>}`。
#[derive(Clone)]
pub struct CloudTranslator {
    client: Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
    retry: RetryConfig,
    max_chunk_len: usize,
    chunk_delay: Duration,
}

impl fmt::Debug for CloudTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudTranslator")
            .field("api_url", &self.api_url)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl CloudTranslator {
    pub fn new(
        client: Client,
        config: &TranslationConfig,
        retry: RetryConfig,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            retry,
            max_chunk_len: config.max_chunk_len,
            chunk_delay: Duration::from_millis(config.cloud_chunk_delay_ms),
        }
    }

    /// 翻译单一区块
    ///
    /// # 参数
    ///
    /// * `chunk` - 待翻译文本
    /// * `api_key` - Cloud Translation API Key
    /// * `source_lang` / `target_lang` - 内部语言代码
    /// * `max_retries` - 总尝试次数
    ///
    /// # 返回
    ///
    /// * `Ok(ChunkTranslation)` - 译文及检测到的源语言
    /// * `Err(TranslationError::Backend)` - 重试耗尽后远端仍返回非成功状态
    /// * `Err(TranslationError::Network)` - 重试耗尽后仍无法完成请求
    /// * `Err(TranslationError::EmptyResult)` - 成功响应中没有译文，不重试
    pub async fn call_chunk(
        &self,
        chunk: &str,
        api_key: &str,
        source_lang: &str,
        target_lang: &str,
        max_retries: usize,
    ) -> Result<ChunkTranslation> {
        let target =
            lang::to_cloud_lang(target_lang).unwrap_or_else(|| target_lang.trim().to_string());
        let source = lang::to_cloud_lang(source_lang);
        let body = CloudTranslateRequest {
            q: [chunk],
            target: &target,
            format: "text",
            source: source.as_deref(),
        };

        tracing::debug!(
            chars = chunk.chars().count(),
            target_lang = %target,
            source_lang = ?source,
            "发送 Cloud Translation 请求"
        );

        let retry = RetryConfig {
            max_retries,
            ..self.retry.clone()
        };
        let body = &body;
        retry_with_backoff(move || self.send_once(api_key, body), &retry).await
    }

    async fn send_once(
        &self,
        api_key: &str,
        body: &CloudTranslateRequest<'_>,
    ) -> Result<ChunkTranslation> {
        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", api_key)])
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TranslationError::network(&e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| TranslationError::network(&e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<CloudErrorResponse>(&response_text)
                .ok()
                .and_then(|payload| payload.error.message)
                .unwrap_or(response_text);
            return Err(TranslationError::Backend {
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed: CloudTranslateResponse = serde_json::from_str(&response_text)
            .map_err(|e| TranslationError::EmptyResult(format!("无法解析响应: {}", e)))?;

        let first = parsed
            .data
            .and_then(|data| data.translations.into_iter().next());
        match first {
            Some(translation) => match translation.translated_text {
                Some(text) if !text.is_empty() => Ok(ChunkTranslation {
                    text,
                    detected_source: translation.detected_source_language,
                }),
                _ => Err(TranslationError::EmptyResult(String::new())),
            },
            None => Err(TranslationError::EmptyResult(String::new())),
        }
    }
}

#[async_trait]
impl ChunkTranslator for CloudTranslator {
    fn name(&self) -> &'static str {
        "Google 翻译"
    }

    fn max_chunk_len(&self) -> usize {
        self.max_chunk_len
    }

    fn inter_chunk_delay(&self) -> Duration {
        self.chunk_delay
    }

    async fn translate_chunk(
        &self,
        chunk: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<ChunkTranslation> {
        self.call_chunk(
            chunk,
            &self.api_key,
            source_lang,
            target_lang,
            self.retry.max_retries,
        )
        .await
    }
}
