use thiserror::Error;

/// Errors raised while routing parsed values into entity fields.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read {found} as {expected}")]
    Coercion {
        expected: &'static str,
        found: String,
    },

    #[error("invalid value for field {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub fn coercion(expected: &'static str, found: impl Into<String>) -> Self {
        Self::Coercion {
            expected,
            found: found.into(),
        }
    }
}
