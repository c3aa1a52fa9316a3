use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use judge_sync::{PollResource, Result, SnapshotSource, SyncError};
use sast_oj_api_types::{SelfTestSnapshot, SubmissionSnapshot};
use sast_oj_core::ContestId;
use tokio::time::Instant;

/// 脚本中的一步拉取结果。
#[derive(Debug, Clone)]
pub enum Step<S> {
    Snapshot(S),
    NotReady,
    Fail(String),
}

struct Call<Id> {
    contest_id: ContestId,
    id: Id,
    at: Instant,
}

/// 按脚本依次返回结果的快照来源；脚本只剩最后一步时重复该步。
pub struct ScriptedSource<R: PollResource> {
    steps: Mutex<VecDeque<Step<R::Snapshot>>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call<R::Id>>>,
}

impl<R: PollResource> ScriptedSource<R> {
    pub fn new(steps: Vec<Step<R::Snapshot>>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn with_delay(steps: Vec<Step<R::Snapshot>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .map(|call| call.at)
            .collect()
    }

    pub fn last_target(&self) -> Option<(ContestId, R::Id)> {
        self.calls
            .lock()
            .expect("calls lock")
            .last()
            .map(|call| (call.contest_id, call.id.clone()))
    }

    fn next_step(&self) -> Step<R::Snapshot> {
        let mut steps = self.steps.lock().expect("steps lock");
        if steps.len() > 1 {
            steps.pop_front().expect("script has steps")
        } else {
            steps.front().cloned().unwrap_or(Step::NotReady)
        }
    }
}

#[async_trait]
impl<R: PollResource> SnapshotSource<R> for ScriptedSource<R> {
    async fn fetch(&self, contest_id: ContestId, id: &R::Id) -> Result<Option<R::Snapshot>> {
        self.calls.lock().expect("calls lock").push(Call {
            contest_id,
            id: id.clone(),
            at: Instant::now(),
        });

        let step = self.next_step();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match step {
            Step::Snapshot(snapshot) => Ok(Some(snapshot)),
            Step::NotReady => Ok(None),
            Step::Fail(message) => Err(SyncError::Validation(message)),
        }
    }
}

pub fn submission_with_state(state: i64) -> SubmissionSnapshot {
    SubmissionSnapshot {
        id: "abc".to_string(),
        code: Some("int main() { return 0; }".to_string()),
        language: "C++17".to_string(),
        point: if state == 1 { 100 } else { 0 },
        state: Some(state),
        status: None,
        created_at: "2024-03-01T12:00:00Z".to_string(),
        updated_at: None,
        total_time: (state == 1).then_some(12_000_000),
        max_memory: (state == 1).then_some(2_097_152),
    }
}

pub fn self_test_done(stdout: &str) -> SelfTestSnapshot {
    SelfTestSnapshot {
        is_compiled: Some(true),
        compile_msg: Some(String::new()),
        stdout: Some(stdout.to_string()),
        stderr: Some(String::new()),
        time: 1_500_000,
        memory: 1_048_576,
    }
}
