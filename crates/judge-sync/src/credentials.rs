//! 登录令牌来源。
//!
//! HTTP 客户端不读取任何全局状态，令牌由构造时注入的 [`CredentialProvider`] 提供。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::config::{ENV_TOKEN, SyncConfig};
use crate::error::Result;

/// 令牌提供者。
pub trait CredentialProvider: Send + Sync {
    /// 当前令牌；未登录时返回 `None`。
    fn token(&self) -> Option<String>;

    /// 后端判定令牌失效（HTTP 401）时调用。
    fn invalidate(&self);
}

/// 内存中的固定令牌。
#[derive(Debug, Default)]
pub struct StaticToken {
    token: Mutex<Option<String>>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn invalidate(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// 保存在本地文件中的令牌，每次请求时读取。
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.trim())?;
        debug!(path = %self.path.display(), "token stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl CredentialProvider for FileTokenStore {
    fn token(&self) -> Option<String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    fn invalidate(&self) {
        if let Err(err) = self.clear() {
            warn!(path = %self.path.display(), error = %err, "failed to remove invalid token");
        }
    }
}

/// 按配置选择令牌来源：`SAST_OJ_TOKEN` 优先，其次是令牌文件。
pub fn from_config(config: &SyncConfig) -> Box<dyn CredentialProvider> {
    if let Ok(token) = std::env::var(ENV_TOKEN) {
        if !token.trim().is_empty() {
            return Box::new(StaticToken::new(token.trim()));
        }
    }

    match config.token_path() {
        Some(path) => Box::new(FileTokenStore::new(path)),
        None => Box::new(StaticToken::anonymous()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_can_be_invalidated() {
        let provider = StaticToken::new("secret");
        assert_eq!(provider.token().as_deref(), Some("secret"));

        provider.invalidate();
        assert!(provider.token().is_none());
        assert!(StaticToken::anonymous().token().is_none());
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = std::env::temp_dir().join(format!("sast-oj-token-{}", uuid::Uuid::new_v4()));
        let store = FileTokenStore::new(dir.join("token"));

        assert!(store.token().is_none());
        store.store("  abc.def  \n").expect("token should be written");
        assert_eq!(store.token().as_deref(), Some("abc.def"));

        store.invalidate();
        assert!(store.token().is_none());
        store.clear().expect("clearing a missing token is fine");

        let _ = std::fs::remove_dir_all(dir);
    }
}
