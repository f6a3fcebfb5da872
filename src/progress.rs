//! 进度通知
//!
//! [`ProgressSink`] 是外部协作方（例如前端进度条），本库只负责调用。
//! 每次请求创建一个 [`ProgressTracker`]，携带请求 ID 和服务名。

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// 进度通知接收方
///
/// 所有方法都是即发即弃的，实现方自行处理内部错误。[`ProgressTracker`]
/// 会拦截实现中的 panic，通知失败不会影响翻译本身。
pub trait ProgressSink: Send + Sync {
    fn start(&self, request_id: &str, service: &str, extra_info: &str);
    fn done(&self, request_id: &str, service: &str, char_count: usize, elapsed_ms: u64);
    fn error(&self, request_id: &str, service: &str, message: &str);
    fn cancel(&self, request_id: &str, service: &str, message: &str);
}

/// 默认实现：输出到 `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn start(&self, request_id: &str, service: &str, extra_info: &str) {
        tracing::info!(request_id, service, "开始翻译 | {}", extra_info);
    }

    fn done(&self, request_id: &str, service: &str, char_count: usize, elapsed_ms: u64) {
        tracing::info!(request_id, service, char_count, elapsed_ms, "翻译完成");
    }

    fn error(&self, request_id: &str, service: &str, message: &str) {
        tracing::warn!(request_id, service, "翻译失败: {}", message);
    }

    fn cancel(&self, request_id: &str, service: &str, message: &str) {
        tracing::info!(request_id, service, "{}", message);
    }
}

/// 单次请求的进度跟踪器
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    request_id: String,
    service: &'static str,
}

impl ProgressTracker {
    /// 创建跟踪器并立即发出 start 通知
    pub fn start(
        sink: Arc<dyn ProgressSink>,
        request_id: impl Into<String>,
        service: &'static str,
        extra_info: &str,
    ) -> Self {
        let tracker = Self {
            sink,
            request_id: request_id.into(),
            service,
        };
        tracker.notify("start", |sink, id, service| {
            sink.start(id, service, extra_info)
        });
        tracker
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn done(&self, char_count: usize, elapsed_ms: u64) {
        self.notify("done", |sink, id, service| {
            sink.done(id, service, char_count, elapsed_ms)
        });
    }

    pub fn error(&self, message: &str) {
        self.notify("error", |sink, id, service| sink.error(id, service, message));
    }

    pub fn cancel(&self, message: &str) {
        self.notify("cancel", |sink, id, service| sink.cancel(id, service, message));
    }

    fn notify<F>(&self, event: &'static str, f: F)
    where
        F: FnOnce(&dyn ProgressSink, &str, &str),
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            f(self.sink.as_ref(), &self.request_id, self.service)
        }));
        if outcome.is_err() {
            tracing::warn!(
                request_id = %self.request_id,
                event,
                "进度通知失败，已忽略"
            );
        }
    }
}
