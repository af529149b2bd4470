use thiserror::Error;

/// First field of a request that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid '{field}' with value '{value}'")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
}

impl ValidationError {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}
