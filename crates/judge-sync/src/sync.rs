use std::sync::Arc;

use sast_oj_api_types::{SelfTestRequest, SubmitRequest};
use sast_oj_core::{
    ContestId, DomainError, Language, ProblemId, SelfTestId, Submission, SubmissionId,
};
use tracing::{info, warn};

use crate::convert::submission_from_snapshot;
use crate::credentials;
use crate::{
    Cooldown, EventBroadcaster, EventStream, JudgeClient, Result, SelfTestPoller,
    SubmissionPoller, SyncConfig, SyncError,
};

/// 提交与自测的统一入口：发起请求并创建对应的轮询门面。
pub struct JudgeSync {
    config: Arc<SyncConfig>,
    client: Arc<JudgeClient>,
    event_broadcaster: Arc<EventBroadcaster>,
    submit_cooldown: Cooldown,
    self_test_cooldown: Cooldown,
}

impl JudgeSync {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let credentials = Arc::from(credentials::from_config(&config));
        let client = JudgeClient::new(&config, credentials)?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: SyncConfig, client: JudgeClient) -> Self {
        info!(
            api_base_url = %client.base_url(),
            event_buffer_size = config.event_buffer_size,
            cooldown_ms = config.cooldown_ms,
            "initializing judge sync"
        );

        Self {
            event_broadcaster: Arc::new(EventBroadcaster::new(config.event_buffer_size)),
            submit_cooldown: Cooldown::new(config.cooldown()),
            self_test_cooldown: Cooldown::new(config.cooldown()),
            client: Arc::new(client),
            config: Arc::new(config),
        }
    }

    /// 提交代码。空代码与冷却期内的重复提交不会发出请求。
    #[tracing::instrument(skip(self, code))]
    pub async fn submit(
        &self,
        contest_id: ContestId,
        problem_id: ProblemId,
        language: Language,
        code: &str,
    ) -> Result<SubmissionId> {
        ensure_code(code)?;
        self.submit_cooldown.try_acquire()?;

        let request = SubmitRequest {
            code: code.to_string(),
            language: language.as_str().to_string(),
        };
        let result = self.client.submit(contest_id, problem_id, &request).await;
        log_outcome("submission", &result);
        result
    }

    #[tracing::instrument(skip(self, code, input))]
    pub async fn start_self_test(
        &self,
        contest_id: ContestId,
        problem_id: ProblemId,
        language: Language,
        code: &str,
        input: &str,
    ) -> Result<SelfTestId> {
        ensure_code(code)?;
        self.self_test_cooldown.try_acquire()?;

        let request = SelfTestRequest {
            code: code.to_string(),
            language: language.as_str().to_string(),
            input: input.to_string(),
        };
        let result = self.client.start_self_test(contest_id, problem_id, &request).await;
        log_outcome("self_test", &result);
        result
    }

    pub fn submission_poller(&self, contest_id: ContestId, id: SubmissionId) -> SubmissionPoller {
        SubmissionPoller::new(
            self.client.clone(),
            self.config.submission,
            self.event_broadcaster.clone(),
        )
        .with_target(contest_id, id)
    }

    pub fn self_test_poller(&self, contest_id: ContestId, id: SelfTestId) -> SelfTestPoller {
        SelfTestPoller::new(
            self.client.clone(),
            self.config.self_test,
            self.event_broadcaster.clone(),
        )
        .with_target(contest_id, id)
    }

    /// 提交详情连同各测试点结果。
    pub async fn submission_detail(
        &self,
        contest_id: ContestId,
        id: &SubmissionId,
    ) -> Result<Submission> {
        let (snapshot, cases) = tokio::try_join!(
            self.client.submission(contest_id, id),
            self.client.submission_cases(contest_id, id),
        )?;
        submission_from_snapshot(&snapshot, &cases)
    }

    pub fn subscribe_events(&self) -> EventStream {
        self.event_broadcaster.subscribe()
    }

    pub fn client(&self) -> &JudgeClient {
        &self.client
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}

fn ensure_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(DomainError::EmptySourceCode.into());
    }
    Ok(())
}

fn log_outcome<T: std::fmt::Display>(kind: &str, result: &Result<T>) {
    match result {
        Ok(id) => info!(kind, id = %id, "request accepted"),
        Err(err @ SyncError::RateLimited(_)) => {
            warn!(kind, error = %err, "rate limited by backend");
        }
        Err(err) => warn!(kind, error = %err, "request failed"),
    }
}
