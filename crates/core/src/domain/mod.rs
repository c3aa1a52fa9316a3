mod error;
mod format;
mod ids;
mod language;
mod self_test;
mod submission;
mod submission_status;

pub use error::DomainError;
pub use format::{format_duration_ms, format_file_size, format_memory_kb};
pub use ids::{ContestId, ProblemId, SelfTestId, SubmissionId};
pub use language::Language;
pub use self_test::{SelfTestResult, SelfTestVerdict};
pub use submission::{CaseState, Submission, TestCase};
pub use submission_status::{Locale, StatusInfo, SubmissionStatus};
