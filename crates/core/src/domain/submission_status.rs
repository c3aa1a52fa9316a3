use std::fmt;

/// Semantic status of a submission, keyed by the backend's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SubmissionStatus {
    #[default]
    Invalid = 0,
    Accepted = 1,
    CompileError = 2,
    WrongAnswer = 3,
    PresentationError = 4,
    RuntimeError = 5,
    TimeLimitExceeded = 6,
    MemoryLimitExceeded = 7,
    OutputLimitExceeded = 8,
    Waiting = 9,
    Judging = 10,
    SystemError = 11,
    Unaccepted = 12,
}

/// Label language for [`SubmissionStatus::label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    Chinese,
    English,
}

/// Display bundle for a status: label plus every classification predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    pub status: SubmissionStatus,
    pub label: &'static str,
    pub is_pending: bool,
    pub is_final: bool,
    pub is_accepted: bool,
    pub is_error: bool,
    pub is_system: bool,
}

impl SubmissionStatus {
    /// All statuses in code order.
    pub const ALL: [SubmissionStatus; 13] = [
        Self::Invalid,
        Self::Accepted,
        Self::CompileError,
        Self::WrongAnswer,
        Self::PresentationError,
        Self::RuntimeError,
        Self::TimeLimitExceeded,
        Self::MemoryLimitExceeded,
        Self::OutputLimitExceeded,
        Self::Waiting,
        Self::Judging,
        Self::SystemError,
        Self::Unaccepted,
    ];

    /// Maps a raw backend code onto a status. Unknown or absent codes are `Invalid`.
    pub fn classify(code: Option<i64>) -> Self {
        code.map_or(Self::Invalid, Self::from_code)
    }

    pub fn from_code(code: i64) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(Self::Invalid)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Waiting and Judging are the only non-terminal statuses.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Waiting | Self::Judging)
    }

    pub fn is_final(self) -> bool {
        !self.is_pending()
    }

    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::CompileError
                | Self::WrongAnswer
                | Self::PresentationError
                | Self::RuntimeError
                | Self::TimeLimitExceeded
                | Self::MemoryLimitExceeded
                | Self::OutputLimitExceeded
                | Self::Unaccepted
        )
    }

    pub fn is_system(self) -> bool {
        matches!(self, Self::Invalid | Self::SystemError)
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::Chinese => self.chinese_label(),
            Locale::English => self.english_label(),
        }
    }

    pub fn info(self, locale: Locale) -> StatusInfo {
        StatusInfo {
            status: self,
            label: self.label(locale),
            is_pending: self.is_pending(),
            is_final: self.is_final(),
            is_accepted: self.is_accepted(),
            is_error: self.is_error(),
            is_system: self.is_system(),
        }
    }

    fn chinese_label(self) -> &'static str {
        match self {
            Self::Invalid => "无效",
            Self::Accepted => "通过",
            Self::CompileError => "编译错误",
            Self::WrongAnswer => "答案错误",
            Self::PresentationError => "格式错误",
            Self::RuntimeError => "运行错误",
            Self::TimeLimitExceeded => "时间超限",
            Self::MemoryLimitExceeded => "内存超限",
            Self::OutputLimitExceeded => "输出超限",
            Self::Waiting => "等待中",
            Self::Judging => "评测中",
            Self::SystemError => "系统错误",
            Self::Unaccepted => "不通过",
        }
    }

    fn english_label(self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::Accepted => "Accepted",
            Self::CompileError => "Compile Error",
            Self::WrongAnswer => "Wrong Answer",
            Self::PresentationError => "Presentation Error",
            Self::RuntimeError => "Runtime Error",
            Self::TimeLimitExceeded => "Time Limit Exceeded",
            Self::MemoryLimitExceeded => "Memory Limit Exceeded",
            Self::OutputLimitExceeded => "Output Limit Exceeded",
            Self::Waiting => "Waiting",
            Self::Judging => "Judging",
            Self::SystemError => "System Error",
            Self::Unaccepted => "Unaccepted",
        }
    }
}

impl From<i64> for SubmissionStatus {
    fn from(code: i64) -> Self {
        Self::from_code(code)
    }
}

impl From<SubmissionStatus> for u8 {
    fn from(status: SubmissionStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english_label())
    }
}
