use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainParseError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),
    #[error("invalid ether amount: {0}")]
    InvalidAmount(String),
    #[error("unknown action kind: {0}")]
    UnknownActionKind(String),
}

/// Failure reported by the embedding host SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host rejected the request: {message}")]
    Rejected { message: String },
    /// The host resolved with a payload that lacks `field`.
    #[error("malformed host response (missing `{field}`): {message}")]
    MalformedResponse { field: String, message: String },
    #[error("host sdk unavailable: {message}")]
    Unavailable { message: String },
}

impl HostError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            HostError::Rejected { message }
            | HostError::MalformedResponse { message, .. }
            | HostError::Unavailable { message } => message,
        }
    }
}

/// Failure reported by the wallet connector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("no wallet connector named {0}")]
    ConnectorNotFound(String),
    #[error("wallet connector {0} is not ready")]
    ConnectorNotReady(String),
    #[error("wallet is not connected")]
    NotConnected,
    #[error("request rejected by user: {0}")]
    UserRejected(String),
    #[error("network switch failed: {0}")]
    SwitchFailed(String),
    #[error("node error: {0}")]
    Node(String),
}
