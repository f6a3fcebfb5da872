//! # Google Translator
//!
//! 面向长文本的 Google 翻译库：分块、重试、付费接口与免费接口之间的回退、
//! 进度通知以及协作式取消。
//!
//! ## 主要特性
//!
//! - **文本分块**: 按换行分块，超长行按字符硬切，分块可精确还原原文
//! - **错误恢复**: 有界重试，网络错误归类为超时、连接失败、协议错误
//! - **后端回退**: 有 API Key 时使用 Cloud Translation v2，否则使用免费接口
//! - **协作式取消**: 每个分块之前检查取消句柄，已在进行的请求会执行完毕
//! - **统一结果**: 所有失败都转换为 `{success: false, error, interrupted}`
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use google_translator::{
//!     CancellationToken, TranslationLibConfig, TranslationRequest, TranslationService,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TranslationLibConfig::with_google_api_key("YOUR_API_KEY");
//!     let service = TranslationService::new(config);
//!
//!     let cancel = CancellationToken::new();
//!     let request = service.request("Hello, world!").with_cancel(cancel.clone());
//!     let result = service.translate(request).await;
//!     println!("{}", serde_json::to_string(&result).unwrap());
//! }
//! ```
//!
//! ## 配置文件支持
//!
//! ```toml
//! [translation]
//! source_lang = "auto"
//! target_lang = "zh"
//! max_chunk_len = 4500
//! allow_free_fallback = true
//!
//! [retry]
//! max_retries = 2
//! initial_delay_ms = 1000
//!
//! [backends.google]
//! api_key = "..."
//! ```

pub mod backend;
pub mod chunker;
pub mod config;
pub mod error;
pub mod lang;
pub mod progress;
pub mod translator;
pub mod types;

pub use backend::{ChunkTranslator, CloudTranslator};
#[cfg(feature = "free-backend")]
pub use backend::FreeTranslator;
pub use chunker::{reassemble, split_text_by_paragraphs, Chunk};
pub use config::{ConfigStore, TranslationLibConfig, GOOGLE_BACKEND};
pub use error::{NetworkErrorKind, Result, TranslationError};
pub use progress::{ProgressSink, ProgressTracker, TracingProgress};
pub use translator::{retry_with_backoff, SelectedBackend, TranslationService};
pub use types::{
    BackendConfig, ChunkTranslation, RetryConfig, TranslationConfig, TranslationData,
    TranslationRequest, TranslationResult,
};
pub use tokio_util::sync::CancellationToken;
