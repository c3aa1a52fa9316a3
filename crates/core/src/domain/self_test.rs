use std::fmt;

use super::{format_duration_ms, format_file_size};

/// Verdict derived from a finished self-test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelfTestVerdict {
    CompileError,
    RuntimeError,
    Accepted,
}

impl SelfTestVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompileError => "Compile Error",
            Self::RuntimeError => "Runtime Error",
            Self::Accepted => "Accepted",
        }
    }
}

impl fmt::Display for SelfTestVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finished self-test run: compile flag, captured streams and resource usage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelfTestResult {
    pub compiled: bool,
    pub compile_message: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub time_ns: u64,
    pub memory_bytes: u64,
}

impl SelfTestResult {
    /// Any non-blank stderr after a successful compile counts as a runtime error.
    pub fn verdict(&self) -> SelfTestVerdict {
        if !self.compiled {
            SelfTestVerdict::CompileError
        } else if self.has_stderr() {
            SelfTestVerdict::RuntimeError
        } else {
            SelfTestVerdict::Accepted
        }
    }

    pub fn is_success(&self) -> bool {
        self.verdict() == SelfTestVerdict::Accepted
    }

    /// The text a user should see first: compiler output, stderr, or stdout.
    pub fn display_output(&self) -> &str {
        match self.verdict() {
            SelfTestVerdict::CompileError => non_empty(&self.compile_message).unwrap_or("编译失败"),
            SelfTestVerdict::RuntimeError => self.stderr.as_deref().unwrap_or_default(),
            SelfTestVerdict::Accepted => non_empty(&self.stdout).unwrap_or("执行成功"),
        }
    }

    pub fn execution_time(&self) -> String {
        format_duration_ms(self.time_ns)
    }

    pub fn memory(&self) -> String {
        format_file_size(self.memory_bytes)
    }

    fn has_stderr(&self) -> bool {
        self.stderr
            .as_deref()
            .is_some_and(|stderr| !stderr.trim().is_empty())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{SelfTestResult, SelfTestVerdict};

    #[test]
    fn clean_run_is_accepted() {
        let result = SelfTestResult {
            compiled: true,
            stdout: Some("4".to_string()),
            stderr: Some(String::new()),
            time_ns: 12_000_000,
            memory_bytes: 204_800,
            ..Default::default()
        };

        assert_eq!(result.verdict(), SelfTestVerdict::Accepted);
        assert!(result.is_success());
        assert_eq!(result.display_output(), "4");
        assert_eq!(result.execution_time(), "12ms");
        assert_eq!(result.memory(), "200 KB");
    }

    #[test]
    fn compile_failure_shows_compiler_message() {
        let result = SelfTestResult {
            compiled: false,
            compile_message: Some("main.cpp:1: error".to_string()),
            ..Default::default()
        };

        assert_eq!(result.verdict(), SelfTestVerdict::CompileError);
        assert_eq!(result.display_output(), "main.cpp:1: error");

        let silent = SelfTestResult::default();
        assert_eq!(silent.display_output(), "编译失败");
    }

    #[test]
    fn blank_stderr_does_not_count_as_runtime_error() {
        let whitespace = SelfTestResult {
            compiled: true,
            stderr: Some("  \n".to_string()),
            ..Default::default()
        };
        assert_eq!(whitespace.verdict(), SelfTestVerdict::Accepted);
        assert_eq!(whitespace.display_output(), "执行成功");

        let crashed = SelfTestResult {
            compiled: true,
            stderr: Some("Segmentation fault".to_string()),
            ..Default::default()
        };
        assert_eq!(crashed.verdict(), SelfTestVerdict::RuntimeError);
        assert_eq!(crashed.display_output(), "Segmentation fault");
    }
}
