use judge_sync::convert::self_test_result;
use sast_oj_api_types::{SelfTestSnapshot, SubmissionSnapshot};
use sast_oj_core::{CaseState, Locale, Submission, SubmissionStatus};

pub fn status_label(snapshot: &SubmissionSnapshot, locale: Locale) -> &'static str {
    SubmissionStatus::classify(snapshot.status_code()).label(locale)
}

pub fn print_submission(submission: &Submission, locale: Locale) {
    println!(
        "{} {} | {} | score {}",
        submission.id,
        submission.status.label(locale),
        submission.language,
        submission.point
    );
    if let (Some(time), Some(memory)) = (
        submission.total_time_display(),
        submission.max_memory_display(),
    ) {
        println!("time {time}, memory {memory}");
    }

    if submission.cases.is_empty() {
        return;
    }
    println!(
        "cases passed: {}/{}",
        submission.passed_cases(),
        submission.cases.len()
    );
    for case in &submission.cases {
        let state = match case.state {
            CaseState::Passed => SubmissionStatus::Accepted.label(locale),
            CaseState::Failed(status) => status.label(locale),
        };
        println!(
            "  #{:<3} {:<12} {:>4} pts {:>8} {:>10}",
            case.index,
            state,
            case.point,
            case.time_display(),
            case.memory_display()
        );
    }
}

pub fn print_self_test(snapshot: &SelfTestSnapshot) {
    let Some(result) = self_test_result(snapshot) else {
        println!("self-test has not finished");
        return;
    };

    println!(
        "{} | time {} | memory {}",
        result.verdict(),
        result.execution_time(),
        result.memory()
    );
    println!("{}", result.display_output());
}
