use super::{
    DomainError, SubmissionId, SubmissionStatus, format_duration_ms, format_memory_kb,
};

/// Outcome of one test case. The backend marks a pass with code `1`; any other
/// code is a failure and is kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Passed,
    Failed(SubmissionStatus),
}

impl CaseState {
    pub fn from_code(code: i64) -> Self {
        match SubmissionStatus::from_code(code) {
            SubmissionStatus::Accepted => Self::Passed,
            other => Self::Failed(other),
        }
    }

    pub fn is_passed(self) -> bool {
        self == Self::Passed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub index: u32,
    pub point: i64,
    pub state: CaseState,
    pub time_ns: u64,
    pub memory_bytes: u64,
}

impl TestCase {
    /// Builds a case from the wire representation, where time and memory
    /// arrive as decimal strings.
    pub fn parse(
        index: u32,
        point: i64,
        state: i64,
        time: &str,
        memory: &str,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            index,
            point,
            state: CaseState::from_code(state),
            time_ns: parse_counter("time", time)?,
            memory_bytes: parse_counter("memory", memory)?,
        })
    }

    pub fn time_display(&self) -> String {
        format_duration_ms(self.time_ns)
    }

    pub fn memory_display(&self) -> String {
        format_memory_kb(self.memory_bytes)
    }
}

/// A judged (or still judging) submission as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: SubmissionId,
    pub code: Option<String>,
    pub language: String,
    pub point: i64,
    pub status: SubmissionStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub total_time_ns: Option<u64>,
    pub max_memory_bytes: Option<u64>,
    pub cases: Vec<TestCase>,
}

impl Submission {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    pub fn passed_cases(&self) -> usize {
        self.cases.iter().filter(|case| case.state.is_passed()).count()
    }

    pub fn total_time_display(&self) -> Option<String> {
        self.total_time_ns.map(format_duration_ms)
    }

    pub fn max_memory_display(&self) -> Option<String> {
        self.max_memory_bytes.map(format_memory_kb)
    }

    pub fn with_cases(mut self, mut cases: Vec<TestCase>) -> Self {
        cases.sort_by_key(|case| case.index);
        self.cases = cases;
        self
    }
}

fn parse_counter(field: &'static str, value: &str) -> Result<u64, DomainError> {
    value
        .trim()
        .parse()
        .map_err(|_| DomainError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
