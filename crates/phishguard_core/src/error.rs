use std::fmt;

use crate::{NormalizationError, ValidationError};

/// Shown when the service rejects a request without saying why.
pub const SERVICE_ERROR_FALLBACK: &str = "An error occurred while analyzing the URL.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestErrorKind {
    ValidationFailed(ValidationError),
    Timeout,
    NetworkUnreachable,
    ServiceError(String),
    InvalidResponse(NormalizationError),
    Unexpected,
}

/// Why a submission ended in `Failed`, with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: RequestErrorKind,
    pub message: String,
}

impl RequestError {
    pub fn timeout() -> Self {
        Self {
            kind: RequestErrorKind::Timeout,
            message: "Request timed out. Please try again.".to_string(),
        }
    }

    pub fn network_unreachable(endpoint: &str) -> Self {
        Self {
            kind: RequestErrorKind::NetworkUnreachable,
            message: format!(
                "Cannot connect to the API server. Make sure the prediction service is running on {endpoint}"
            ),
        }
    }

    /// Uses the server's own message when it sent a non-empty one.
    pub fn service(server_message: Option<String>) -> Self {
        let message = server_message
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| SERVICE_ERROR_FALLBACK.to_string());
        Self {
            kind: RequestErrorKind::ServiceError(message.clone()),
            message,
        }
    }

    pub fn unexpected() -> Self {
        Self {
            kind: RequestErrorKind::Unexpected,
            message: "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

impl From<ValidationError> for RequestError {
    fn from(err: ValidationError) -> Self {
        Self {
            message: err.to_string(),
            kind: RequestErrorKind::ValidationFailed(err),
        }
    }
}

impl From<NormalizationError> for RequestError {
    fn from(err: NormalizationError) -> Self {
        Self {
            message: err.to_string(),
            kind: RequestErrorKind::InvalidResponse(err),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RequestError {}
