//! Wire types exchanged with the judge backend.
//!
//! Field names follow the backend's JSON contract, including its camelCase
//! keys and the `complieMsg` spelling.

use serde::{Deserialize, Serialize};

/// `GET /user/contests/{contestId}/submissions/{submissionId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSnapshot {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub language: String,
    pub point: i64,
    /// Status code on the detail endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i64>,
    /// Status code on the list endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory: Option<u64>,
}

impl SubmissionSnapshot {
    /// Raw status code, preferring `state` over `status`.
    #[must_use]
    pub fn status_code(&self) -> Option<i64> {
        self.state.or(self.status)
    }
}

/// `GET /user/contests/{contestId}/self-tests/{selfTestId}`.
///
/// The backend only fills `isCompiled` once the run is over, so its presence
/// is what marks a finished self-test.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfTestSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_compiled: Option<bool>,
    #[serde(default, rename = "complieMsg", skip_serializing_if = "Option::is_none")]
    pub compile_msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub memory: u64,
}

impl SelfTestSnapshot {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_compiled.is_some()
    }
}

/// One entry of `GET .../submissions/{submissionId}/cases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCase {
    pub index: u32,
    pub point: i64,
    pub state: i64,
    /// Nanoseconds, as a decimal string.
    pub time: String,
    /// Bytes, as a decimal string.
    pub memory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCasesResponse {
    #[serde(default)]
    pub cases: Vec<SubmissionCase>,
}

/// Body of `POST /user/contests/{contestId}/problems/{problemId}/submission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub code: String,
    pub language: String,
}

/// Body of `POST /user/contests/{contestId}/problems/{problemId}/test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfTestRequest {
    pub code: String,
    pub language: String,
    pub input: String,
}

/// Response of both initiation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UuidResponse {
    pub uuid: String,
}

/// Error envelope `{ code, message }`. A non-zero `code` marks a failure even
/// on a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.code != 0
    }
}
