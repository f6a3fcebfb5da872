//! 错误处理模块
//!
//! 定义翻译库中使用的错误类型。所有错误都在 [`TranslationService::translate`]
//! 的边界处转换为统一的 [`TranslationResult`]，不会向调用方抛出。
//!
//! [`TranslationService::translate`]: crate::TranslationService::translate
//! [`TranslationResult`]: crate::TranslationResult

use std::fmt;
use thiserror::Error;

/// 网络错误类别
///
/// 只暴露语义类别，不暴露底层异常类型名。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// 请求超时
    Timeout,
    /// 连接失败（拒绝连接、DNS 解析失败等）
    Connection,
    /// 协议错误（响应体读取失败、重定向异常等）
    Protocol,
}

impl NetworkErrorKind {
    /// 根据 reqwest 错误归类
    pub fn classify(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            NetworkErrorKind::Timeout
        } else if error.is_connect() {
            NetworkErrorKind::Connection
        } else {
            NetworkErrorKind::Protocol
        }
    }
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkErrorKind::Timeout => write!(f, "请求超时"),
            NetworkErrorKind::Connection => write!(f, "连接失败"),
            NetworkErrorKind::Protocol => write!(f, "协议错误"),
        }
    }
}

/// 翻译错误类型
///
/// # 变体说明
///
/// * `EmptyInput` - 待翻译文本为空，未发起任何请求
/// * `BackendUnavailable` - 未配置 API Key 且免费后端不可用，消息包含修复方法
/// * `Backend` - 远端在重试耗尽后仍拒绝请求
/// * `EmptyResult` - 成功响应中没有译文
/// * `Network` - 超时、连接或协议错误，重试耗尽后返回
/// * `Interrupted` - 协作式取消，不属于后端故障
/// * `Config` - 配置文件读写错误
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    #[error("Google 翻译: 待翻译文本不能为空")]
    EmptyInput,

    #[error("Google 翻译: {0}")]
    BackendUnavailable(String),

    #[error("Google 翻译: 请求失败 ({}) {message}", status_label(.status))]
    Backend {
        /// HTTP 状态码，非 HTTP 失败时为 `None`
        status: Option<u16>,
        /// 后端返回的错误消息
        message: String,
    },

    /// 附带的描述仅用于日志
    #[error("Google 翻译: 返回结果为空")]
    EmptyResult(String),

    #[error("Google 翻译: 网络请求失败 ({kind})")]
    Network {
        kind: NetworkErrorKind,
        /// 底层错误描述，仅用于日志
        detail: String,
    },

    #[error("任务被中断")]
    Interrupted,

    #[error("配置错误: {0}")]
    Config(String),
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "-".to_string(), |s| s.to_string())
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranslationError::Backend { .. } | TranslationError::Network { .. }
        )
    }

    /// 是否为用户主动取消
    pub fn is_interrupted(&self) -> bool {
        matches!(self, TranslationError::Interrupted)
    }

    pub(crate) fn network(error: &reqwest::Error) -> Self {
        TranslationError::Network {
            kind: NetworkErrorKind::classify(error),
            detail: error.to_string(),
        }
    }
}

/// 翻译结果类型别名
///
/// # 示例
///
/// ```rust
/// use google_translator::{Result, TranslationError};
///
/// fn example_function() -> Result<String> {
///     Err(TranslationError::EmptyInput)
/// }
///
/// assert!(example_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, TranslationError>;
