//! 评测后端 HTTP 客户端。

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use sast_oj_api_types::{
    ErrorResponse, SelfTestRequest, SelfTestSnapshot, SubmissionCase, SubmissionCasesResponse,
    SubmissionSnapshot, SubmitRequest, UuidResponse,
};
use sast_oj_core::{ContestId, ProblemId, SelfTestId, SubmissionId};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::credentials::CredentialProvider;
use crate::error::{Result, SyncError};

/// 后端在限流时返回的错误文案。
const RATE_LIMIT_MARKER: &str = "rate limit exceeded";
const TOKEN_HEADER: &str = "Token";

pub struct JudgeClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl JudgeClient {
    pub fn new(config: &SyncConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_http_client(
            http,
            config.api_base_url.clone(),
            credentials,
        ))
    }

    pub fn with_http_client(
        http: Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 提交代码，返回用于轮询的提交 ID。
    #[tracing::instrument(skip(self, request), fields(language = %request.language))]
    pub async fn submit(
        &self,
        contest_id: ContestId,
        problem_id: ProblemId,
        request: &SubmitRequest,
    ) -> Result<SubmissionId> {
        let path = format!("/user/contests/{contest_id}/problems/{problem_id}/submission");
        let response = self.request(Method::POST, &path).json(request).send().await?;
        let body: UuidResponse = self.read_json(response).await?;
        Ok(SubmissionId::new(body.uuid)?)
    }

    /// 发起自测，返回用于轮询的自测 ID。
    #[tracing::instrument(skip(self, request), fields(language = %request.language))]
    pub async fn start_self_test(
        &self,
        contest_id: ContestId,
        problem_id: ProblemId,
        request: &SelfTestRequest,
    ) -> Result<SelfTestId> {
        let path = format!("/user/contests/{contest_id}/problems/{problem_id}/test");
        let response = self.request(Method::POST, &path).json(request).send().await?;
        let body: UuidResponse = self.read_json(response).await?;
        Ok(SelfTestId::new(body.uuid)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn submission(
        &self,
        contest_id: ContestId,
        submission_id: &SubmissionId,
    ) -> Result<SubmissionSnapshot> {
        let path = format!("/user/contests/{contest_id}/submissions/{submission_id}");
        let response = self.request(Method::GET, &path).send().await?;
        self.read_json(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn submission_cases(
        &self,
        contest_id: ContestId,
        submission_id: &SubmissionId,
    ) -> Result<Vec<SubmissionCase>> {
        let path = format!("/user/contests/{contest_id}/submissions/{submission_id}/cases");
        let response = self.request(Method::GET, &path).send().await?;
        let body: SubmissionCasesResponse = self.read_json(response).await?;
        Ok(body.cases)
    }

    /// 查询自测结果。后端以 HTTP 500 表示自测仍在运行，此时返回 `None`。
    #[tracing::instrument(skip(self))]
    pub async fn self_test(
        &self,
        contest_id: ContestId,
        self_test_id: &SelfTestId,
    ) -> Result<Option<SelfTestSnapshot>> {
        let path = format!("/user/contests/{contest_id}/self-tests/{self_test_id}");
        let response = self.request(Method::GET, &path).send().await?;
        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            debug!("self-test result not ready yet");
            return Ok(None);
        }
        self.read_json(response).await.map(Some)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");

        match self.credentials.token() {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .map(|envelope| envelope.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("HTTP Error: {}", status.as_u16()));
            return Err(self.status_error(status, message));
        }

        decode_body(&body)
    }

    fn status_error(&self, status: StatusCode, message: String) -> SyncError {
        if status == StatusCode::UNAUTHORIZED {
            warn!("token rejected by backend, clearing stored credential");
            self.credentials.invalidate();
            return SyncError::Unauthorized(message);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || is_rate_limit_message(&message) {
            return SyncError::RateLimited(message);
        }
        SyncError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// 解析 2xx 响应体。形如 `{code, message}` 且 `code != 0` 的响应按错误处理。
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|err| SyncError::Validation(format!("response is not JSON: {err}")))?;

    if let Ok(envelope) = serde_json::from_value::<ErrorResponse>(value.clone()) {
        if envelope.is_error() {
            if is_rate_limit_message(&envelope.message) {
                return Err(SyncError::RateLimited(envelope.message));
            }
            return Err(SyncError::ApiResponse {
                code: envelope.code,
                message: envelope.message,
            });
        }
    }

    serde_json::from_value(value).map_err(|err| SyncError::Validation(err.to_string()))
}

fn is_rate_limit_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains(RATE_LIMIT_MARKER)
}

#[cfg(test)]
mod tests {
    use sast_oj_api_types::{SubmissionSnapshot, UuidResponse};

    use super::{decode_body, is_rate_limit_message};
    use crate::error::SyncError;

    #[test]
    fn decodes_plain_payload() {
        let body = br#"{"uuid":"0b7c"}"#;
        let decoded: UuidResponse = decode_body(body).expect("payload should decode");
        assert_eq!(decoded.uuid, "0b7c");
    }

    #[test]
    fn error_envelope_on_success_status_is_an_error() {
        let body = br#"{"code":10003,"message":"contest not joined"}"#;
        let err = decode_body::<UuidResponse>(body).expect_err("envelope should be rejected");

        match err {
            SyncError::ApiResponse { code, message } => {
                assert_eq!(code, 10003);
                assert_eq!(message, "contest not joined");
            }
            other => panic!("expected ApiResponse, got: {other:?}"),
        }
    }

    #[test]
    fn rate_limit_envelope_is_classified() {
        let body = br#"{"code":1,"message":"rate Limit Exceeded"}"#;
        let err = decode_body::<UuidResponse>(body).expect_err("envelope should be rejected");
        assert!(err.is_rate_limited());
        assert!(is_rate_limit_message("Rate Limit Exceeded, slow down"));
    }

    #[test]
    fn malformed_payload_is_a_validation_error() {
        let err = decode_body::<SubmissionSnapshot>(br#"{"id":"abc"}"#)
            .expect_err("missing fields should be rejected");
        assert!(matches!(err, SyncError::Validation(_)));

        let err = decode_body::<SubmissionSnapshot>(b"<html>").expect_err("not JSON");
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[test]
    fn submission_source_code_is_not_mistaken_for_an_envelope() {
        let body = br#"{"id":"abc","code":"int main(){}","language":"C","point":0,"state":9,"createdAt":"now"}"#;
        let decoded: SubmissionSnapshot = decode_body(body).expect("snapshot should decode");
        assert_eq!(decoded.state, Some(9));
    }
}
