use std::sync::Arc;

use sast_oj_core::ContestId;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::detector::CompletionDetector;
use super::{PollCallbacks, PollOutcome, PollPhase, SessionId, SessionState};
use crate::config::PollSettings;
use crate::events::{EventBroadcaster, SyncEvent};
use crate::resource::{PollResource, SnapshotSource};

/// 一个轮询会话的任务体：顺序拉取，直到终态、用完次数或被取消。
pub(crate) struct SessionTask<R: PollResource> {
    pub(crate) session_id: SessionId,
    pub(crate) source: Arc<dyn SnapshotSource<R>>,
    pub(crate) contest_id: ContestId,
    pub(crate) resource_id: R::Id,
    pub(crate) settings: PollSettings,
    pub(crate) callbacks: PollCallbacks<R::Snapshot>,
    pub(crate) events: Arc<EventBroadcaster>,
    pub(crate) state: Arc<SessionState<R::Snapshot>>,
    pub(crate) cancel: CancellationToken,
    pub(crate) wake: Arc<Notify>,
}

impl<R: PollResource> SessionTask<R> {
    pub(crate) async fn run(self) -> PollOutcome<R::Snapshot> {
        let mut detector = CompletionDetector::<R>::new();

        loop {
            if !self.is_live() {
                return PollOutcome::Cancelled;
            }

            let attempt = self.state.begin_attempt();
            debug!(
                session_id = %self.session_id,
                resource_id = %self.resource_id,
                attempt,
                "fetching snapshot"
            );
            let result = self.source.fetch(self.contest_id, &self.resource_id).await;
            self.state.set_loading(false);

            if !self.is_live() {
                debug!(
                    session_id = %self.session_id,
                    attempt,
                    "session stopped, discarding fetch result"
                );
                return PollOutcome::Cancelled;
            }

            match result {
                Ok(Some(snapshot)) => {
                    let detection = detector.observe(&snapshot);
                    self.state.set_snapshot(snapshot.clone());

                    if detection.changed {
                        debug!(session_id = %self.session_id, attempt, "status changed");
                        self.events.emit(SyncEvent::StatusChanged {
                            session_id: self.session_id.clone(),
                            attempt,
                            snapshot: to_json(&snapshot),
                        });
                        self.callbacks.status_changed(&snapshot);
                    }

                    if detection.terminal {
                        return self.complete(snapshot, attempt);
                    }
                }
                Ok(None) => {
                    debug!(session_id = %self.session_id, attempt, "resource not ready yet");
                }
                Err(err) => {
                    warn!(
                        session_id = %self.session_id,
                        attempt,
                        error = %err,
                        "fetch failed, will retry"
                    );
                    self.events.emit(SyncEvent::FetchFailed {
                        session_id: self.session_id.clone(),
                        attempt,
                        error: err.to_string(),
                    });
                }
            }

            if attempt >= self.settings.max_attempts {
                return self.give_up(attempt);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return PollOutcome::Cancelled,
                _ = tokio::time::sleep(self.settings.interval()) => {}
                _ = self.wake.notified() => {
                    debug!(session_id = %self.session_id, "refresh requested");
                }
            }
        }
    }

    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && self.state.is_active()
    }

    fn complete(&self, snapshot: R::Snapshot, attempts: u32) -> PollOutcome<R::Snapshot> {
        if !self.state.finish(PollPhase::Completed) {
            return PollOutcome::Cancelled;
        }

        info!(
            session_id = %self.session_id,
            kind = %R::KIND,
            resource_id = %self.resource_id,
            attempts,
            "polling completed"
        );
        self.callbacks.completed(&snapshot);
        self.events.emit(SyncEvent::Completed {
            session_id: self.session_id.clone(),
            attempts,
            snapshot: to_json(&snapshot),
        });

        PollOutcome::Completed(snapshot)
    }

    fn give_up(&self, attempts: u32) -> PollOutcome<R::Snapshot> {
        if !self.state.finish(PollPhase::GaveUp) {
            return PollOutcome::Cancelled;
        }

        info!(
            session_id = %self.session_id,
            kind = %R::KIND,
            resource_id = %self.resource_id,
            attempts,
            "max attempts reached, giving up"
        );
        self.events.emit(SyncEvent::GaveUp {
            session_id: self.session_id.clone(),
            attempts,
        });

        PollOutcome::GaveUp { attempts }
    }
}

fn to_json<S: serde::Serialize>(snapshot: &S) -> serde_json::Value {
    serde_json::to_value(snapshot).unwrap_or(serde_json::Value::Null)
}
