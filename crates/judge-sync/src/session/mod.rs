//! 轮询会话模型。

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 变化与终态判定。
pub mod detector;
/// 对外暴露的轮询门面。
pub mod poller;
mod scheduler;

pub use detector::{CompletionDetector, Detection};
pub use poller::{Poller, SelfTestPoller, SubmissionPoller};

/// 轮询会话唯一标识，仅用于日志与事件关联。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// 生成新的随机会话 ID。
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for SessionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会话阶段。`Completed` 与 `GaveUp` 保持不变，直到再次启动轮询。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    #[default]
    Idle,
    Polling,
    Completed,
    GaveUp,
}

/// 一次轮询会话的结局。
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<S> {
    /// 观察到终态快照。
    Completed(S),
    /// 用完尝试次数仍未结束。
    GaveUp { attempts: u32 },
    /// 被停止、被替换目标或门面被丢弃。
    Cancelled,
}

impl<S> PollOutcome<S> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

pub type SnapshotCallback<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// 调用方注册的回调，在会话任务中同步执行。
pub struct PollCallbacks<S> {
    pub(crate) on_status_change: Option<SnapshotCallback<S>>,
    pub(crate) on_complete: Option<SnapshotCallback<S>>,
}

impl<S> PollCallbacks<S> {
    pub fn new() -> Self {
        Self {
            on_status_change: None,
            on_complete: None,
        }
    }

    pub fn on_status_change(mut self, callback: impl Fn(&S) + Send + Sync + 'static) -> Self {
        self.on_status_change = Some(Arc::new(callback));
        self
    }

    /// 每个会话至多触发一次；用完尝试次数时不触发。
    pub fn on_complete(mut self, callback: impl Fn(&S) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    pub(crate) fn status_changed(&self, snapshot: &S) {
        if let Some(callback) = &self.on_status_change {
            callback(snapshot);
        }
    }

    pub(crate) fn completed(&self, snapshot: &S) {
        if let Some(callback) = &self.on_complete {
            callback(snapshot);
        }
    }
}

impl<S> Default for PollCallbacks<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for PollCallbacks<S> {
    fn clone(&self) -> Self {
        Self {
            on_status_change: self.on_status_change.clone(),
            on_complete: self.on_complete.clone(),
        }
    }
}

/// 单个会话的共享状态，由会话任务与门面共同读写。
/// 会话的结束只经由 `finish` 的 CAS 发生，停止与终态之间只有一方生效。
pub(crate) struct SessionState<S> {
    active: AtomicBool,
    loading: AtomicBool,
    attempts: AtomicU32,
    phase: RwLock<PollPhase>,
    snapshot: RwLock<Option<S>>,
}

impl<S: Clone> SessionState<S> {
    pub(crate) fn idle(snapshot: Option<S>) -> Self {
        Self {
            active: AtomicBool::new(false),
            loading: AtomicBool::new(false),
            attempts: AtomicU32::new(0),
            phase: RwLock::new(PollPhase::Idle),
            snapshot: RwLock::new(snapshot),
        }
    }

    pub(crate) fn polling(snapshot: Option<S>) -> Self {
        let state = Self::idle(snapshot);
        state.active.store(true, Ordering::SeqCst);
        state.set_phase(PollPhase::Polling);
        state
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// 计数并返回本次尝试的序号（从 1 开始）。
    pub(crate) fn begin_attempt(&self) -> u32 {
        self.loading.store(true, Ordering::SeqCst);
        self.attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn phase(&self) -> PollPhase {
        *self.phase.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: PollPhase) {
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    pub(crate) fn snapshot(&self) -> Option<S> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_snapshot(&self, snapshot: S) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    /// 结束会话。停止与终态之间只有先到者生效，返回是否由本次调用结束。
    pub(crate) fn finish(&self, phase: PollPhase) -> bool {
        let finished = self
            .active
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if finished {
            self.loading.store(false, Ordering::SeqCst);
            self.set_phase(phase);
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_round_trips_through_string() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().expect("uuid should parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn finish_wins_only_once() {
        let state = SessionState::<u32>::polling(None);
        assert!(state.is_active());
        assert_eq!(state.phase(), PollPhase::Polling);

        assert!(state.finish(PollPhase::Completed));
        assert!(!state.finish(PollPhase::Idle));
        assert!(!state.is_active());
        assert_eq!(state.phase(), PollPhase::Completed);
    }

    #[test]
    fn attempts_are_numbered_from_one() {
        let state = SessionState::<u32>::polling(Some(7));
        assert_eq!(state.begin_attempt(), 1);
        assert!(state.is_loading());
        assert_eq!(state.begin_attempt(), 2);
        assert_eq!(state.attempts(), 2);
        assert_eq!(state.snapshot(), Some(7));
    }

    #[test]
    fn callbacks_are_optional() {
        let callbacks = PollCallbacks::<u32>::default();
        callbacks.status_changed(&1);
        callbacks.completed(&1);

        let seen = Arc::new(AtomicU32::new(0));
        let counter = seen.clone();
        let callbacks = PollCallbacks::new().on_complete(move |value: &u32| {
            counter.fetch_add(*value, Ordering::SeqCst);
        });
        callbacks.clone().completed(&3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
