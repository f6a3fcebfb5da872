//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入和自动发现功能，并支持环境变量覆盖。

use crate::error::{Result, TranslationError};
use crate::types::{BackendConfig, RetryConfig, TranslationConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Google 后端在配置存储中的名称
pub const GOOGLE_BACKEND: &str = "google";

/// 只读的后端凭据存储
///
/// 返回 `None` 或没有 `api_key` 都是正常状态，此时使用免费后端。
pub trait ConfigStore: Send + Sync {
    fn backend_config(&self, backend: &str) -> Option<BackendConfig>;
}

/// 翻译库配置结构
///
/// # 示例
///
/// ```rust,no_run
/// use google_translator::TranslationLibConfig;
///
/// // 从默认位置加载配置
/// let config = TranslationLibConfig::load_from_default_locations();
///
/// // 从指定文件加载配置
/// let config = TranslationLibConfig::from_file("config.toml").unwrap();
///
/// // 保存配置到文件
/// config.save_to_file("output.toml").unwrap();
/// ```
///
/// 配置文件格式：
///
/// ```toml
/// [translation]
/// source_lang = "auto"
/// target_lang = "zh"
/// max_chunk_len = 4500
///
/// [retry]
/// max_retries = 2
///
/// [backends.google]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationLibConfig {
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,
}

impl TranslationLibConfig {
    /// 仅包含 Google API Key 的配置
    pub fn with_google_api_key(api_key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.backends.insert(
            GOOGLE_BACKEND.to_string(),
            BackendConfig {
                api_key: Some(api_key.into()),
            },
        );
        config
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TranslationError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TranslationError::Config(e.to_string()))
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| TranslationError::Config(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| TranslationError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from multiple possible locations, then apply env overrides
    pub fn load_from_default_locations() -> Self {
        let possible_paths = [
            "translation-config.toml",
            "config.toml",
            ".translation-config.toml",
        ];

        let mut config = None;
        for path in &possible_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(loaded) => {
                        tracing::info!("加载配置文件: {}", path);
                        config = Some(loaded);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("无法加载配置文件 {}: {}", path, e);
                    }
                }
            }
        }

        let mut config = config.unwrap_or_else(|| {
            tracing::debug!("未找到配置文件，使用默认配置");
            Self::default()
        });
        config.apply_env_overrides();
        config
    }

    /// 环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GOOGLE_TRANSLATE_API_KEY") {
            self.backends
                .entry(GOOGLE_BACKEND.to_string())
                .or_default()
                .api_key = Some(key);
            tracing::info!("环境变量覆盖 Google API Key");
        }

        if let Some(val) = lookup("GOOGLE_TRANSLATE_TARGET_LANG") {
            self.translation.target_lang = val;
        }

        if let Some(val) = lookup("GOOGLE_TRANSLATE_SOURCE_LANG") {
            self.translation.source_lang = val;
        }
    }

    /// Generate example configuration file
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let mut example_config = Self::default();
        example_config
            .backends
            .insert(GOOGLE_BACKEND.to_string(), BackendConfig::default());
        example_config.save_to_file(path)
    }
}

impl ConfigStore for TranslationLibConfig {
    fn backend_config(&self, backend: &str) -> Option<BackendConfig> {
        self.backends.get(backend).cloned()
    }
}
