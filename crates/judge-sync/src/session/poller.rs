use std::sync::Arc;

use chrono::Utc;
use sast_oj_core::ContestId;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::scheduler::SessionTask;
use super::{PollCallbacks, PollOutcome, PollPhase, SessionId, SessionState};
use crate::config::PollSettings;
use crate::error::Result;
use crate::events::{EventBroadcaster, SyncEvent};
use crate::resource::{PollResource, SelfTestResource, SnapshotSource, SubmissionResource};

pub type SubmissionPoller = Poller<SubmissionResource>;
pub type SelfTestPoller = Poller<SelfTestResource>;

struct RunningSession<S> {
    cancel: CancellationToken,
    wake: Arc<Notify>,
    handle: JoinHandle<PollOutcome<S>>,
}

/// 轮询门面：持有目标资源与当前会话，对外暴露快照与控制操作。
///
/// 每次 `start_polling` 启动一个独立的 tokio 任务；同一时刻至多一个会话在运行。
/// 丢弃门面会取消尚未执行的拉取。
pub struct Poller<R: PollResource> {
    source: Arc<dyn SnapshotSource<R>>,
    settings: PollSettings,
    callbacks: PollCallbacks<R::Snapshot>,
    events: Arc<EventBroadcaster>,
    target: Option<(ContestId, R::Id)>,
    session_id: SessionId,
    state: Arc<SessionState<R::Snapshot>>,
    running: Option<RunningSession<R::Snapshot>>,
}

impl<R: PollResource> Poller<R> {
    pub fn new(
        source: Arc<dyn SnapshotSource<R>>,
        settings: PollSettings,
        events: Arc<EventBroadcaster>,
    ) -> Self {
        Self {
            source,
            settings,
            callbacks: PollCallbacks::default(),
            events,
            target: None,
            session_id: SessionId::new(),
            state: Arc::new(SessionState::idle(None)),
            running: None,
        }
    }

    pub fn with_callbacks(mut self, callbacks: PollCallbacks<R::Snapshot>) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_target(mut self, contest_id: ContestId, id: R::Id) -> Self {
        self.target = Some((contest_id, id));
        self
    }

    /// 切换目标资源。目标变化时停止当前会话并清空快照与计数；`None` 禁用轮询。
    pub fn set_target(&mut self, contest_id: ContestId, id: Option<R::Id>) {
        let next = id.map(|id| (contest_id, id));
        if next == self.target {
            return;
        }

        self.stop_polling();
        self.running = None;
        self.state = Arc::new(SessionState::idle(None));
        self.target = next;
    }

    /// 启动轮询并立即发起第一次拉取。已在轮询或没有目标时不做任何事，返回 `false`。
    ///
    /// 必须在 tokio 运行时中调用。
    pub fn start_polling(&mut self) -> bool {
        self.reap_aborted_session();
        if self.state.is_active() {
            debug!(session_id = %self.session_id, "polling already active");
            return false;
        }
        let Some((contest_id, resource_id)) = self.target.clone() else {
            debug!("no target set, polling disabled");
            return false;
        };

        self.session_id = SessionId::new();
        self.state = Arc::new(SessionState::polling(self.state.snapshot()));

        let cancel = CancellationToken::new();
        let wake = Arc::new(Notify::new());
        let task = SessionTask::<R> {
            session_id: self.session_id.clone(),
            source: self.source.clone(),
            contest_id,
            resource_id: resource_id.clone(),
            settings: self.settings,
            callbacks: self.callbacks.clone(),
            events: self.events.clone(),
            state: self.state.clone(),
            cancel: cancel.clone(),
            wake: wake.clone(),
        };

        info!(
            session_id = %self.session_id,
            kind = %R::KIND,
            resource_id = %resource_id,
            contest_id = %contest_id,
            interval_ms = self.settings.interval_ms,
            max_attempts = self.settings.max_attempts,
            "starting poll session"
        );
        self.events.emit(SyncEvent::PollStarted {
            session_id: self.session_id.clone(),
            kind: R::KIND,
            resource_id: resource_id.to_string(),
            started_at: Utc::now(),
        });

        self.running = Some(RunningSession {
            cancel,
            wake,
            handle: tokio::spawn(task.run()),
        });
        true
    }

    /// 停止轮询，取消已排期的拉取。可重复调用。
    pub fn stop_polling(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
        self.finish_stopped();
    }

    /// 以 `Idle` 结束会话，抢到结束权时广播 `Stopped`。
    fn finish_stopped(&self) {
        if self.state.finish(PollPhase::Idle) {
            let attempts = self.state.attempts();
            info!(session_id = %self.session_id, attempts, "polling stopped");
            self.events.emit(SyncEvent::Stopped {
                session_id: self.session_id.clone(),
                attempts,
            });
        }
    }

    /// 会话任务异常退出（如回调 panic）时状态仍为活跃，这里将其收回到 `Idle`。
    fn reap_aborted_session(&mut self) {
        let aborted = self
            .running
            .as_ref()
            .is_some_and(|running| running.handle.is_finished());
        if aborted && self.state.is_active() {
            warn!(session_id = %self.session_id, "poll session task exited without finishing");
            self.running = None;
            self.finish_stopped();
        }
    }

    /// 轮询中：唤醒会话立即进行下一次拉取（仍计入次数）。
    /// 未轮询：单独拉取一次并更新快照，不触发回调。
    pub async fn refresh(&mut self) -> Result<()> {
        if self.state.is_active() {
            if let Some(running) = &self.running {
                running.wake.notify_one();
            }
            return Ok(());
        }

        let Some((contest_id, resource_id)) = self.target.clone() else {
            return Ok(());
        };

        self.state.set_loading(true);
        let result = self.source.fetch(contest_id, &resource_id).await;
        self.state.set_loading(false);

        if let Some(snapshot) = result? {
            self.state.set_snapshot(snapshot);
        }
        Ok(())
    }

    /// 等待当前会话结束。没有运行中的会话时按当前阶段给出结局。
    pub async fn join(&mut self) -> PollOutcome<R::Snapshot> {
        match self.running.take() {
            Some(running) => match running.handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(session_id = %self.session_id, error = %err, "poll session task aborted");
                    self.finish_stopped();
                    PollOutcome::Cancelled
                }
            },
            None => match (self.state.phase(), self.state.snapshot()) {
                (PollPhase::Completed, Some(snapshot)) => PollOutcome::Completed(snapshot),
                (PollPhase::GaveUp, _) => PollOutcome::GaveUp {
                    attempts: self.state.attempts(),
                },
                _ => PollOutcome::Cancelled,
            },
        }
    }

    pub fn snapshot(&self) -> Option<R::Snapshot> {
        self.state.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_polling(&self) -> bool {
        self.state.is_active()
    }

    pub fn attempts(&self) -> u32 {
        self.state.attempts()
    }

    pub fn max_attempts(&self) -> u32 {
        self.settings.max_attempts
    }

    pub fn phase(&self) -> PollPhase {
        self.state.phase()
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn target(&self) -> Option<&R::Id> {
        self.target.as_ref().map(|(_, id)| id)
    }
}

impl<R: PollResource> Drop for Poller<R> {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
        self.finish_stopped();
    }
}
