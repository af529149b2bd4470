use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Ok,
    NotFound,
    InvalidPayload,
    UnexpectedError,
    Unauthorized,
}

/// Envelope wrapped around every HTTP response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: ResponseStatus::Ok,
            code: 200,
            message: String::new(),
            data: Some(data),
        }
    }

    /// Success with a message and no payload.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            code: 200,
            message: message.into(),
            data: None,
        }
    }

    pub fn error(status: ResponseStatus, code: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            data: None,
        }
    }
}
