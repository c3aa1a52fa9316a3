use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, ensure};
use serde::Deserialize;
type Result<T> = anyhow::Result<T>;

/// 覆盖后端地址的环境变量。
pub const ENV_API_URL: &str = "SAST_OJ_API_URL";
/// 直接提供登录令牌的环境变量。
pub const ENV_TOKEN: &str = "SAST_OJ_TOKEN";

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    #[serde(default = "PollSettings::submission")]
    pub submission: PollSettings,
    #[serde(default = "PollSettings::self_test")]
    pub self_test: PollSettings,
}

impl SyncConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("failed to deserialize sync config")?;
        config.validate()?;
        Ok(config)
    }

    /// 用环境变量覆盖文件中的后端地址。
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api_base_url: {}", self.api_base_url))?;
        ensure!(self.event_buffer_size > 0, "event_buffer_size must be positive");
        self.submission.validate("submission")?;
        self.self_test.validate("self_test")?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// 令牌文件位置：显式配置优先，否则位于用户配置目录下。
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_file
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("sast-oj").join("token")))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            event_buffer_size: default_event_buffer_size(),
            cooldown_ms: default_cooldown_ms(),
            token_file: None,
            submission: PollSettings::submission(),
            self_test: PollSettings::self_test(),
        }
    }
}

/// 单类资源的轮询节奏。
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl PollSettings {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            max_attempts,
        }
    }

    /// 提交轮询：每 2 秒一次，最多 150 次（5 分钟）。
    pub fn submission() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: 150,
        }
    }

    /// 自测轮询：每 2 秒一次，最多 30 次（60 秒）。
    pub fn self_test() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: 30,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self, section: &str) -> Result<()> {
        ensure!(self.interval_ms > 0, "{section}.interval_ms must be positive");
        ensure!(self.max_attempts > 0, "{section}.max_attempts must be positive");
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://acm.sast.fun/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_event_buffer_size() -> usize {
    256
}

fn default_cooldown_ms() -> u64 {
    3_000
}

fn default_interval_ms() -> u64 {
    2_000
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{PollSettings, SyncConfig};

    #[test]
    fn test_parse_config() {
        let raw = r#"
api_base_url = "http://localhost:8080/api"
request_timeout_secs = 5
cooldown_ms = 1500
token_file = "/tmp/sast-oj-token"

[submission]
interval_ms = 1000
max_attempts = 10

[self_test]
max_attempts = 5
"#;

        let config = SyncConfig::from_str(raw).expect("config should parse");
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.cooldown(), Duration::from_millis(1500));
        assert_eq!(config.event_buffer_size, 256);
        assert_eq!(config.token_path(), Some(PathBuf::from("/tmp/sast-oj-token")));
        assert_eq!(config.submission, PollSettings::new(Duration::from_secs(1), 10));
        assert_eq!(config.self_test.interval(), Duration::from_secs(2));
        assert_eq!(config.self_test.max_attempts, 5);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SyncConfig::from_str("").expect("empty config should parse");

        assert_eq!(config.api_base_url, "https://acm.sast.fun/api");
        assert_eq!(config.submission, PollSettings::submission());
        assert_eq!(config.submission.max_attempts, 150);
        assert_eq!(config.self_test.max_attempts, 30);
        assert_eq!(config.cooldown(), Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let raw = r#"
[submission]
max_attempts = 0
"#;
        let err = SyncConfig::from_str(raw).expect_err("zero attempts should be rejected");
        assert!(format!("{err:#}").contains("submission.max_attempts"));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = SyncConfig::from_str(r#"api_base_url = "not a url""#)
            .expect_err("base url should be validated");
        assert!(format!("{err:#}").contains("invalid api_base_url"));
    }
}
