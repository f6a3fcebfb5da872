//! 翻译服务核心模块
//!
//! 负责一次翻译请求的完整流程：输入校验、后端选择、文本分块、逐块串行翻译
//! （分块之间检查取消）、结果拼接以及进度通知。

use crate::backend::{ChunkTranslator, CloudTranslator};
#[cfg(feature = "free-backend")]
use crate::backend::FreeTranslator;
use crate::chunker::{reassemble, split_text_by_paragraphs};
use crate::config::{ConfigStore, TranslationLibConfig, GOOGLE_BACKEND};
use crate::error::{Result, TranslationError};
use crate::lang;
use crate::progress::{ProgressSink, ProgressTracker, TracingProgress};
use crate::types::{
    RetryConfig, TranslationConfig, TranslationData, TranslationRequest, TranslationResult,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// 带退避的重试机制
///
/// `config.max_retries` 为总尝试次数（至少 1 次）。只有
/// [`TranslationError::is_retryable`] 为真的错误会重试，其余错误立即返回。
///
/// # 参数
///
/// * `operation` - 要执行的异步操作
/// * `config` - 重试配置
///
/// # 返回
///
/// * `Ok(T)` - 操作成功的结果
/// * `Err(TranslationError)` - 最后一次尝试的错误
pub async fn retry_with_backoff<F, Fut, T>(mut operation: F, config: &RetryConfig) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let attempts = config.max_retries.max(1);
    let mut delay = config.initial_delay_ms;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() || attempt >= attempts => return Err(e),
            Err(e) => {
                tracing::warn!(
                    "Google 翻译请求重试 ({}/{}): {}. {}ms 后重试",
                    attempt,
                    attempts,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
                delay = std::cmp::min(
                    (delay as f64 * config.backoff_multiplier) as u64,
                    config.max_delay_ms,
                );
                attempt += 1;
            }
        }
    }
}

/// 本次请求选定的后端
///
/// 在请求开始时根据凭据和可用性选定一次，之后不再切换。
#[derive(Debug)]
pub enum SelectedBackend {
    /// 付费的 Cloud Translation API
    Preferred(CloudTranslator),
    /// 免费端点
    #[cfg(feature = "free-backend")]
    Fallback(FreeTranslator),
}

impl SelectedBackend {
    pub fn translator(&self) -> &dyn ChunkTranslator {
        match self {
            SelectedBackend::Preferred(cloud) => cloud,
            #[cfg(feature = "free-backend")]
            SelectedBackend::Fallback(free) => free,
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, SelectedBackend::Preferred(_))
    }
}

/// 翻译服务
///
/// `translate` 永远不会返回错误：所有失败都转换为
/// `TranslationResult { success: false, .. }`，用户取消时 `interrupted` 为真。
///
/// # 示例
///
/// ```rust,no_run
/// use google_translator::{TranslationLibConfig, TranslationRequest, TranslationService};
///
/// #[tokio::main]
/// async fn main() {
///     let service = TranslationService::new(TranslationLibConfig::load_from_default_locations());
///     let result = service.translate(TranslationRequest::new("Hello, world!", "zh")).await;
///     if let Some(data) = result.data {
///         println!("Translation: {}", data.translated);
///     } else if !result.interrupted {
///         eprintln!("{}", result.error.unwrap_or_default());
///     }
/// }
/// ```
#[derive(Clone)]
pub struct TranslationService {
    /// HTTP客户端，用于API调用
    client: Client,
    config: TranslationConfig,
    retry: RetryConfig,
    store: Arc<dyn ConfigStore>,
    progress: Arc<dyn ProgressSink>,
    /// 宿主级别的中断令牌，对所有请求生效
    interrupt: CancellationToken,
}

impl TranslationService {
    /// 创建新的翻译服务实例，配置本身同时作为凭据存储
    pub fn new(config: TranslationLibConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.translation.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("创建HTTP客户端失败: {}，使用默认客户端", e);
                Client::new()
            });

        Self {
            client,
            config: config.translation.clone(),
            retry: config.retry.clone(),
            store: Arc::new(config),
            progress: Arc::new(TracingProgress),
            interrupt: CancellationToken::new(),
        }
    }

    /// 使用外部的凭据存储（每次请求都会重新读取）
    pub fn with_config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_progress_sink(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// 设置宿主级别的中断令牌
    ///
    /// 令牌取消后无法复原，宿主在下一轮执行前换入新的令牌即可。
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn interrupt_token(&self) -> &CancellationToken {
        &self.interrupt
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 以配置中的默认源语言和目标语言构建请求
    pub fn request(&self, text: impl Into<String>) -> TranslationRequest {
        TranslationRequest::new(text, self.config.target_lang.as_str())
            .with_source_lang(self.config.source_lang.as_str())
    }

    /// 翻译文本，返回与后端无关的统一结果
    pub async fn translate(&self, request: TranslationRequest) -> TranslationResult {
        self.try_translate(request).await.into()
    }

    /// 翻译文本，返回带类型的错误
    ///
    /// # 返回
    ///
    /// * `Err(TranslationError::EmptyInput)` - 文本为空，未发起请求
    /// * `Err(TranslationError::BackendUnavailable)` - 没有可用后端
    /// * `Err(TranslationError::Interrupted)` - 分块之间检测到取消
    /// * 其他错误来自后端调用
    pub async fn try_translate(&self, request: TranslationRequest) -> Result<TranslationData> {
        ensure_not_blank(&request.text)?;
        let backend = self.select_backend()?;
        self.translate_with(backend.translator(), request).await
    }

    /// 根据凭据选择后端：有 API Key 用付费接口，否则用免费端点
    pub fn select_backend(&self) -> Result<SelectedBackend> {
        let api_key = self
            .store
            .backend_config(GOOGLE_BACKEND)
            .and_then(|config| config.api_key().map(str::to_string));

        if let Some(api_key) = api_key {
            tracing::debug!("使用 Cloud Translation API");
            return Ok(SelectedBackend::Preferred(CloudTranslator::new(
                self.client.clone(),
                &self.config,
                self.retry.clone(),
                api_key,
            )));
        }

        #[cfg(feature = "free-backend")]
        {
            if self.config.allow_free_fallback {
                tracing::debug!("未配置 API Key，使用免费接口");
                return Ok(SelectedBackend::Fallback(FreeTranslator::new(&self.config)));
            }
        }

        Err(TranslationError::BackendUnavailable(
            "未配置 API Key 且免费翻译接口不可用。请在配置的 [backends.google] 中设置 api_key \
             （或设置环境变量 GOOGLE_TRANSLATE_API_KEY），或启用 `free-backend` 特性并将 \
             translation.allow_free_fallback 设为 true"
                .to_string(),
        ))
    }

    /// 使用指定后端翻译
    ///
    /// 分块逐个串行翻译；每个分块开始前检查请求的取消令牌和服务的中断令牌，
    /// 任一被设置则丢弃已翻译的部分并返回 `Interrupted`。
    pub async fn translate_with(
        &self,
        translator: &dyn ChunkTranslator,
        request: TranslationRequest,
    ) -> Result<TranslationData> {
        ensure_not_blank(&request.text)?;

        let request_id = request.request_id.clone().unwrap_or_else(generate_request_id);
        let tracker = ProgressTracker::start(
            self.progress.clone(),
            request_id,
            translator.name(),
            &format!("长度:{}", request.text.chars().count()),
        );

        match self.run_chunks(translator, &request, &tracker).await {
            Ok(data) => Ok(data),
            Err(TranslationError::Interrupted) => {
                tracker.cancel(&format!("任务被中断 | 服务:{}", translator.name()));
                Err(TranslationError::Interrupted)
            }
            Err(e) => {
                tracker.error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run_chunks(
        &self,
        translator: &dyn ChunkTranslator,
        request: &TranslationRequest,
        tracker: &ProgressTracker,
    ) -> Result<TranslationData> {
        let chunks = split_text_by_paragraphs(&request.text, translator.max_chunk_len());
        tracing::debug!(
            request_id = tracker.request_id(),
            chunks = chunks.len(),
            "文本分为 {} 块进行翻译",
            chunks.len()
        );

        let start = Instant::now();
        let delay = translator.inter_chunk_delay();
        let mut translated_parts = Vec::with_capacity(chunks.len());
        let mut detected_source = None;

        for (i, chunk) in chunks.iter().enumerate() {
            if self.is_cancelled(request) {
                return Err(TranslationError::Interrupted);
            }

            let part = translator
                .translate_chunk(&chunk.text, &request.source_lang, &request.target_lang)
                .await?;
            if detected_source.is_none() {
                detected_source = part.detected_source;
            }
            translated_parts.push(part.text);

            // 避免请求过快
            if i + 1 < chunks.len() && !delay.is_zero() {
                sleep(delay).await;
            }
        }

        let translated = reassemble(&chunks, &translated_parts);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracker.done(translated.chars().count(), elapsed_ms);

        let from = match detected_source {
            Some(code) if lang::is_auto(&request.source_lang) => lang::from_backend_lang(&code),
            _ => request.source_lang.clone(),
        };

        Ok(TranslationData {
            translated,
            from,
            to: request.target_lang.clone(),
            original: request.text.clone(),
        })
    }

    fn is_cancelled(&self, request: &TranslationRequest) -> bool {
        self.interrupt.is_cancelled()
            || request
                .cancel
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
    }

    /// 批量翻译，串行调用
    ///
    /// `source_lang` / `target_lang` 为 `None` 时使用配置中的默认值。
    pub async fn batch_translate<S: AsRef<str>>(
        &self,
        texts: &[S],
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> Vec<TranslationResult> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            let mut request = self.request(text.as_ref());
            if let Some(source) = source_lang {
                request.source_lang = source.to_string();
            }
            if let Some(target) = target_lang {
                request.target_lang = target.to_string();
            }
            results.push(self.translate(request).await);
        }
        results
    }
}

fn ensure_not_blank(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        Err(TranslationError::EmptyInput)
    } else {
        Ok(())
    }
}

/// `google_trans_<秒级时间戳>_<4位数字>`
fn generate_request_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let suffix = 1000 + now.subsec_nanos() % 9000;
    format!("google_trans_{}_{}", now.as_secs(), suffix)
}
