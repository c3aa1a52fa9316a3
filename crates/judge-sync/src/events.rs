use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::resource::ResourceKind;
use crate::session::SessionId;

/// 轮询会话对外广播的事件类型。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// 轮询会话开始。
    PollStarted {
        session_id: SessionId,
        kind: ResourceKind,
        resource_id: String,
        started_at: DateTime<Utc>,
    },
    /// 单次拉取失败，已计入尝试次数。
    FetchFailed {
        session_id: SessionId,
        attempt: u32,
        error: String,
    },
    /// 观察到状态变化。
    StatusChanged {
        session_id: SessionId,
        attempt: u32,
        snapshot: serde_json::Value,
    },
    /// 资源进入终态，轮询结束。
    Completed {
        session_id: SessionId,
        attempts: u32,
        snapshot: serde_json::Value,
    },
    /// 达到最大尝试次数仍未完成。
    GaveUp {
        session_id: SessionId,
        attempts: u32,
    },
    /// 轮询被主动停止。
    Stopped {
        session_id: SessionId,
        attempts: u32,
    },
}

impl SyncEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::PollStarted { session_id, .. }
            | Self::FetchFailed { session_id, .. }
            | Self::StatusChanged { session_id, .. }
            | Self::Completed { session_id, .. }
            | Self::GaveUp { session_id, .. }
            | Self::Stopped { session_id, .. } => session_id,
        }
    }

    /// 会话结束类事件。
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::GaveUp { .. } | Self::Stopped { .. }
        )
    }
}

/// 基于 `tokio::broadcast` 的事件广播器。
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBroadcaster {
    /// 创建事件广播器。
    ///
    /// `capacity` 表示内部广播队列容量。
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 广播一个事件。没有订阅者时事件被丢弃。
    pub fn emit(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
        }
    }
}

/// 事件接收流包装器。
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<SyncEvent>,
}

impl EventStream {
    /// 异步接收下一条事件。
    pub async fn recv(&mut self) -> Result<SyncEvent> {
        Ok(self.receiver.recv().await?)
    }

    /// 非阻塞尝试接收一条事件。
    pub fn try_recv(&mut self) -> Result<SyncEvent> {
        Ok(self.receiver.try_recv()?)
    }
}
