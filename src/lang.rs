//! 语言代码映射
//!
//! 本库内部使用 `auto` / `zh` / `en` 以及任意透传的代码。各后端的词汇表不同：
//! Cloud Translation 用 `zh-CN` 表示简体中文，不传 source 即自动检测；
//! 免费端点用小写的 `zh-cn`，自动检测写作 `auto`。
//!
//! 反向映射把所有 `zh` 开头的代码归为 `zh`，简繁体不做区分。

/// 自动检测
pub const AUTO: &str = "auto";

/// 内部代码 → Cloud Translation 代码，`None` 表示交给后端自动检测
pub fn to_cloud_lang(code: &str) -> Option<String> {
    match code.trim() {
        "" | AUTO => None,
        "zh" => Some("zh-CN".to_string()),
        other => Some(other.to_string()),
    }
}

/// 内部代码 → 免费端点代码
pub fn to_free_lang(code: &str) -> String {
    match code.trim() {
        "" | AUTO => AUTO.to_string(),
        "zh" => "zh-cn".to_string(),
        other => other.to_string(),
    }
}

/// 后端代码 → 内部代码
pub fn from_backend_lang(code: &str) -> String {
    if code.is_empty() {
        AUTO.to_string()
    } else if code.starts_with("zh") {
        "zh".to_string()
    } else {
        code.to_string()
    }
}

/// 规范化任意来源的语言代码
pub fn normalize_lang(code: &str) -> String {
    from_backend_lang(code.trim())
}

pub fn is_auto(code: &str) -> bool {
    matches!(code.trim(), "" | AUTO)
}
