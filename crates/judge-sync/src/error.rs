use std::time::Duration;

use sast_oj_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("网络请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("接口返回错误 (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("接口返回业务错误 (code {code}): {message}")]
    ApiResponse { code: i64, message: String },

    #[error("登录已失效: {0}")]
    Unauthorized(String),

    #[error("限流保护: {0}")]
    RateLimited(String),

    #[error("操作过于频繁，请在 {}ms 后重试", .remaining.as_millis())]
    Cooldown { remaining: Duration },

    #[error("响应结构校验失败: {0}")]
    Validation(String),

    #[error("参数错误: {0}")]
    Domain(#[from] DomainError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML 解析错误: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Errors the caller should show as "too many requests" rather than a failure.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Cooldown { .. })
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
