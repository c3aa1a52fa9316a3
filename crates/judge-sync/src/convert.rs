//! 线上 DTO 到领域模型的转换。

use sast_oj_api_types::{SelfTestSnapshot, SubmissionCase, SubmissionSnapshot};
use sast_oj_core::{SelfTestResult, Submission, SubmissionId, SubmissionStatus, TestCase};

use crate::error::Result;

pub fn submission_from_snapshot(
    snapshot: &SubmissionSnapshot,
    cases: &[SubmissionCase],
) -> Result<Submission> {
    let cases = cases
        .iter()
        .map(|case| TestCase::parse(case.index, case.point, case.state, &case.time, &case.memory))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let submission = Submission {
        id: SubmissionId::new(snapshot.id.as_str())?,
        code: snapshot.code.clone(),
        language: snapshot.language.clone(),
        point: snapshot.point,
        status: SubmissionStatus::classify(snapshot.status_code()),
        created_at: snapshot.created_at.clone(),
        updated_at: snapshot.updated_at.clone(),
        total_time_ns: snapshot.total_time,
        max_memory_bytes: snapshot.max_memory,
        cases: Vec::new(),
    };
    Ok(submission.with_cases(cases))
}

/// 只有已结束的自测才有结果。
pub fn self_test_result(snapshot: &SelfTestSnapshot) -> Option<SelfTestResult> {
    let compiled = snapshot.is_compiled?;
    Some(SelfTestResult {
        compiled,
        compile_message: snapshot.compile_msg.clone(),
        stdout: snapshot.stdout.clone(),
        stderr: snapshot.stderr.clone(),
        time_ns: snapshot.time,
        memory_bytes: snapshot.memory,
    })
}
