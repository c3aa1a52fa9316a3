use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Languages accepted by the judge, named the way the backend spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cpp,
    Cpp98,
    Cpp11,
    Cpp11O2,
    Cpp14,
    Cpp14O2,
    Cpp17,
    Cpp17O2,
    Bash,
    NodeJs,
    Java,
    Golang,
    Php,
    Python3,
    Ruby,
}

impl Language {
    pub const ALL: [Language; 16] = [
        Self::C,
        Self::Cpp,
        Self::Cpp98,
        Self::Cpp11,
        Self::Cpp11O2,
        Self::Cpp14,
        Self::Cpp14O2,
        Self::Cpp17,
        Self::Cpp17O2,
        Self::Bash,
        Self::NodeJs,
        Self::Java,
        Self::Golang,
        Self::Php,
        Self::Python3,
        Self::Ruby,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Cpp98 => "C++98",
            Self::Cpp11 => "C++11",
            Self::Cpp11O2 => "C++11(O2)",
            Self::Cpp14 => "C++14",
            Self::Cpp14O2 => "C++14(O2)",
            Self::Cpp17 => "C++17",
            Self::Cpp17O2 => "C++17(O2)",
            Self::Bash => "Bash",
            Self::NodeJs => "NodeJS",
            Self::Java => "Java",
            Self::Golang => "Golang",
            Self::Php => "PHP",
            Self::Python3 => "Python3",
            Self::Ruby => "Ruby",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnsupportedLanguage(s.to_string()))
    }
}
