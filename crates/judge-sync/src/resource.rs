//! 可轮询资源的抽象：提交记录与自测结果。

use std::fmt::{Debug, Display};

use async_trait::async_trait;
use sast_oj_api_types::{SelfTestSnapshot, SubmissionSnapshot};
use sast_oj_core::{ContestId, SelfTestId, SubmissionId, SubmissionStatus};
use serde::{Deserialize, Serialize};

use crate::client::JudgeClient;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Submission,
    SelfTest,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submission => f.write_str("submission"),
            Self::SelfTest => f.write_str("self_test"),
        }
    }
}

/// 一类可轮询资源：决定何时算“状态变化”、何时算“结束”。
pub trait PollResource: Send + Sync + 'static {
    type Id: Clone + Debug + Display + PartialEq + Send + Sync + 'static;
    type Snapshot: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static;

    const KIND: ResourceKind;

    /// `previous` 为上一次观察到的快照，首次拉取时为 `None`。
    fn has_changed(previous: Option<&Self::Snapshot>, current: &Self::Snapshot) -> bool;

    fn is_terminal(snapshot: &Self::Snapshot) -> bool;
}

/// 提交记录：状态码离开 Waiting / Judging 即为终态。
#[derive(Debug, Clone, Copy)]
pub struct SubmissionResource;

impl SubmissionResource {
    pub fn status_of(snapshot: &SubmissionSnapshot) -> SubmissionStatus {
        SubmissionStatus::classify(snapshot.status_code())
    }
}

impl PollResource for SubmissionResource {
    type Id = SubmissionId;
    type Snapshot = SubmissionSnapshot;

    const KIND: ResourceKind = ResourceKind::Submission;

    fn has_changed(previous: Option<&SubmissionSnapshot>, current: &SubmissionSnapshot) -> bool {
        previous.is_some_and(|prev| Self::status_of(prev) != Self::status_of(current))
    }

    fn is_terminal(snapshot: &SubmissionSnapshot) -> bool {
        Self::status_of(snapshot).is_final()
    }
}

/// 自测结果：出现 `isCompiled` 字段即为终态。
#[derive(Debug, Clone, Copy)]
pub struct SelfTestResource;

impl PollResource for SelfTestResource {
    type Id = SelfTestId;
    type Snapshot = SelfTestSnapshot;

    const KIND: ResourceKind = ResourceKind::SelfTest;

    fn has_changed(previous: Option<&SelfTestSnapshot>, current: &SelfTestSnapshot) -> bool {
        previous != Some(current)
    }

    fn is_terminal(snapshot: &SelfTestSnapshot) -> bool {
        snapshot.is_finished()
    }
}

/// 快照来源。`Ok(None)` 表示资源尚未就绪，本次尝试照常计数。
#[async_trait]
pub trait SnapshotSource<R: PollResource>: Send + Sync {
    async fn fetch(&self, contest_id: ContestId, id: &R::Id) -> Result<Option<R::Snapshot>>;
}

#[async_trait]
impl SnapshotSource<SubmissionResource> for JudgeClient {
    async fn fetch(
        &self,
        contest_id: ContestId,
        id: &SubmissionId,
    ) -> Result<Option<SubmissionSnapshot>> {
        self.submission(contest_id, id).await.map(Some)
    }
}

#[async_trait]
impl SnapshotSource<SelfTestResource> for JudgeClient {
    async fn fetch(
        &self,
        contest_id: ContestId,
        id: &SelfTestId,
    ) -> Result<Option<SelfTestSnapshot>> {
        self.self_test(contest_id, id).await
    }
}
