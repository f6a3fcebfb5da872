//! 免费翻译端点（未配置 API Key 时的备选方案）
//!
//! 使用阻塞式 HTTP 客户端，每个分块都放到 `spawn_blocking` 线程中执行并等待，
//! 不阻塞异步运行时；分块之间仍然是串行的。

use super::ChunkTranslator;
use crate::error::{Result, TranslationError};
use crate::lang;
use crate::types::{ChunkTranslation, TranslationConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FreeTranslator {
    api_url: String,
    timeout: Duration,
    max_chunk_len: usize,
    chunk_delay: Duration,
}

impl FreeTranslator {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            api_url: config.free_api_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_chunk_len: config.max_chunk_len,
            chunk_delay: Duration::from_millis(config.free_chunk_delay_ms),
        }
    }
}

#[async_trait]
impl ChunkTranslator for FreeTranslator {
    fn name(&self) -> &'static str {
        "Google 翻译 (免费接口)"
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
        let api_url = self.api_url.clone();
        let timeout = self.timeout;
        let chunk = chunk.to_string();
        let source = lang::to_free_lang(source_lang);
        let target = lang::to_free_lang(target_lang);

        tokio::task::spawn_blocking(move || {
            blocking_translate(&api_url, timeout, &chunk, &source, &target)
        })
        .await
        .map_err(|e| TranslationError::Backend {
            status: None,
            message: format!("翻译线程异常退出: {}", e),
        })?
    }
}

fn blocking_translate(
    api_url: &str,
    timeout: Duration,
    chunk: &str,
    source: &str,
    target: &str,
) -> Result<ChunkTranslation> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TranslationError::network(&e))?;

    let response = client
        .post(api_url)
        .query(&[("client", "gtx"), ("sl", source), ("tl", target), ("dt", "t")])
        .form(&[("q", chunk)])
        .send()
        .map_err(|e| TranslationError::network(&e))?;

    let status = response.status();
    let response_text = response
        .text()
        .map_err(|e| TranslationError::network(&e))?;

    if !status.is_success() {
        return Err(TranslationError::Backend {
            status: Some(status.as_u16()),
            message: response_text,
        });
    }

    let value: Value = serde_json::from_str(&response_text)
        .map_err(|e| TranslationError::EmptyResult(format!("无法解析响应: {}", e)))?;
    parse_free_response(&value)
}

/// 解析 `[[["译文","原文",...],...],null,"en",...]` 形式的响应
fn parse_free_response(value: &Value) -> Result<ChunkTranslation> {
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::EmptyResult("缺少译文段落".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(TranslationError::EmptyResult(String::new()));
    }

    Ok(ChunkTranslation {
        text,
        detected_source: value.get(2).and_then(Value::as_str).map(str::to_string),
    })
}
