//! 翻译后端
//!
//! * [`CloudTranslator`] - Google Cloud Translation v2，需要 API Key
//! * [`FreeTranslator`] - 免费端点，未配置 API Key 时的备选方案
//!   （需启用 `free-backend` 特性）

pub mod cloud;
#[cfg(feature = "free-backend")]
pub mod free;

pub use cloud::CloudTranslator;
#[cfg(feature = "free-backend")]
pub use free::FreeTranslator;

use crate::error::Result;
use crate::types::{ChunkTranslation, DEFAULT_MAX_CHUNK_LEN};
use async_trait::async_trait;
use std::time::Duration;

/// 单个分块的翻译后端
///
/// 编排器按顺序对每个分块调用 [`translate_chunk`](ChunkTranslator::translate_chunk)，
/// 语言代码使用本库的内部词汇，由实现方自行映射。
#[async_trait]
pub trait ChunkTranslator: Send + Sync {
    /// 服务名，用于进度通知和日志
    fn name(&self) -> &'static str;

    /// 单个分块的最大字符数
    fn max_chunk_len(&self) -> usize {
        DEFAULT_MAX_CHUNK_LEN
    }

    /// 相邻两个分块之间的等待时间，避免请求过快
    fn inter_chunk_delay(&self) -> Duration {
        Duration::ZERO
    }

    async fn translate_chunk(
        &self,
        chunk: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<ChunkTranslation>;
}
