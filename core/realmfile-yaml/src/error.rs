use realmfile_model::ModelError;
use thiserror::Error;

/// Errors from scanning, parsing, or writing documents.
#[derive(Debug, Error)]
pub enum YamlError {
    #[error("line {line}: {message}")]
    Scan { line: usize, message: String },

    #[error("line {line}: unsupported syntax ({feature})")]
    Unsupported { line: usize, feature: &'static str },

    #[error("mapping key {found:?} is not a string")]
    InvalidKey { found: String },

    #[error("unexpected {event} event")]
    UnexpectedEvent { event: &'static str },

    #[error("document is not a {expected}")]
    UnexpectedDocument { expected: &'static str },

    #[error("cannot write a {kind} value here")]
    Unwritable { kind: &'static str },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type YamlResult<T> = Result<T, YamlError>;

impl YamlError {
    pub fn scan(line: usize, message: impl Into<String>) -> Self {
        Self::Scan {
            line,
            message: message.into(),
        }
    }
}
