//! 类型定义模块
//!
//! 定义翻译库中使用的配置、请求、响应以及对外统一的结果结构。

use crate::error::TranslationError;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Cloud Translation v2 默认地址
pub const DEFAULT_CLOUD_API_URL: &str = "https://translation.googleapis.com/language/translate/v2";
/// 免费翻译端点默认地址
pub const DEFAULT_FREE_API_URL: &str = "https://translate.googleapis.com/translate_a/single";
/// 单个分块的最大字符数，单次请求约 5KB 以内较稳妥
pub const DEFAULT_MAX_CHUNK_LEN: usize = 4500;

/// 翻译配置
///
/// 包含翻译服务的所有配置选项，如API地址、语言设置、分块和节流参数等。
///
/// # 字段说明
///
/// * `source_lang` - 默认源语言代码，"auto"表示自动检测
/// * `target_lang` - 默认目标语言代码
/// * `api_url` - Cloud Translation v2 地址
/// * `free_api_url` - 免费翻译端点地址
/// * `max_chunk_len` - 单个分块的最大字符数
/// * `request_timeout_secs` - 单次请求超时（秒）
/// * `cloud_chunk_delay_ms` - 付费后端分块之间的间隔
/// * `free_chunk_delay_ms` - 免费后端分块之间的间隔
/// * `allow_free_fallback` - 未配置 API Key 时是否允许使用免费后端
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub source_lang: String,
    pub target_lang: String,
    pub api_url: String,
    pub free_api_url: String,
    pub max_chunk_len: usize,
    pub request_timeout_secs: u64,
    pub cloud_chunk_delay_ms: u64,
    pub free_chunk_delay_ms: u64,
    pub allow_free_fallback: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: "auto".to_string(),
            target_lang: "zh".to_string(),
            api_url: DEFAULT_CLOUD_API_URL.to_string(),
            free_api_url: DEFAULT_FREE_API_URL.to_string(),
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
            request_timeout_secs: 15,
            cloud_chunk_delay_ms: 300,
            free_chunk_delay_ms: 500,
            allow_free_fallback: true,
        }
    }
}

/// 重试配置
///
/// `max_retries` 是总尝试次数（至少 1 次），不是首次失败之后的额外次数。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 1000,
            max_delay_ms: 1000,
            backoff_multiplier: 1.0, // 固定 1 秒间隔
        }
    }
}

/// 单个后端的凭据配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl BackendConfig {
    /// 去除空白后的 API Key，空字符串视为未配置
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct CloudTranslateRequest<'a> {
    pub q: [&'a str; 1],
    pub target: &'a str,
    pub format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct CloudTranslateResponse {
    pub data: Option<CloudTranslateData>,
}

#[derive(Debug, Deserialize)]
pub struct CloudTranslateData {
    #[serde(default)]
    pub translations: Vec<CloudTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudTranslation {
    pub translated_text: Option<String>,
    pub detected_source_language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloudErrorResponse {
    pub error: CloudErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct CloudErrorBody {
    pub message: Option<String>,
}

/// 单个分块的翻译结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTranslation {
    pub text: String,
    /// 后端检测到的源语言（后端词汇表中的代码）
    pub detected_source: Option<String>,
}

impl ChunkTranslation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detected_source: None,
        }
    }
}

/// 一次翻译请求
///
/// # 示例
///
/// ```rust
/// use google_translator::{CancellationToken, TranslationRequest};
///
/// let cancel = CancellationToken::new();
/// let request = TranslationRequest::new("Hello", "zh")
///     .with_source_lang("en")
///     .with_cancel(cancel.clone());
/// assert_eq!(request.source_lang, "en");
/// ```
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub request_id: Option<String>,
    pub cancel: Option<CancellationToken>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: "auto".to_string(),
            target_lang: target_lang.into(),
            request_id: None,
            cancel: None,
        }
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// 翻译成功时返回的数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationData {
    pub translated: String,
    /// 实际的源语言；请求为 auto 且后端报告了检测结果时为检测到的语言
    pub from: String,
    pub to: String,
    pub original: String,
}

/// 对外统一的结果结构，与后端无关
///
/// 序列化后形如 `{"success":true,"data":{...}}` 或
/// `{"success":false,"error":"任务被中断","interrupted":true}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TranslationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interrupted: bool,
}

impl From<std::result::Result<TranslationData, TranslationError>> for TranslationResult {
    fn from(result: std::result::Result<TranslationData, TranslationError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
                interrupted: false,
            },
            Err(e) => Self {
                success: false,
                data: None,
                interrupted: e.is_interrupted(),
                error: Some(e.to_string()),
            },
        }
    }
}
