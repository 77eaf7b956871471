use std::fmt;

use serde_json::Value;

pub type RequestId = u64;

/// A response the prediction service completed with a success status.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReply {
    pub status: u16,
    /// Parsed JSON body, or `Value::Null` when the body was not JSON.
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PredictionCompleted {
        request_id: RequestId,
        result: Result<ServiceReply, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Transport-level failure classes, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Unreachable,
    HttpStatus {
        status: u16,
        server_message: Option<String>,
    },
    BodyTooLarge {
        max_bytes: u64,
    },
    InvalidEndpoint,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unreachable => write!(f, "service unreachable"),
            FailureKind::HttpStatus {
                status,
                server_message: Some(message),
            } => write!(f, "http status {status} ({message})"),
            FailureKind::HttpStatus { status, .. } => write!(f, "http status {status}"),
            FailureKind::BodyTooLarge { max_bytes } => {
                write!(f, "response larger than {max_bytes} bytes")
            }
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::Other => write!(f, "request error"),
        }
    }
}
