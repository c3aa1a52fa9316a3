use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("source code must not be empty")]
    EmptySourceCode,

    #[error("invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}
