use std::fmt;

use shared::{
    domain::{ActionKind, NetworkId},
    error::{HostError, WalletError},
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    Ready,
    Context,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStage::Ready => f.write_str("ready handshake"),
            InitStage::Context => f.write_str("context fetch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Fatal to the session: status becomes `Error` and composing stays unavailable.
    #[error("host {stage} failed: {source}")]
    Initialization { stage: InitStage, source: HostError },
    #[error("hosting surface was torn down during initialization")]
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("cannot compose a cast before the host sdk has loaded")]
    NotReady,
    #[error("composing a cast requires a signed-in host user")]
    Unauthenticated,
    #[error("host failed to compose cast: {message}")]
    Host { message: String },
}

impl From<HostError> for ComposeError {
    fn from(value: HostError) -> Self {
        ComposeError::Host {
            message: value.message().to_string(),
        }
    }
}

/// Failure scoped to a single action flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{kind}: wallet is not connected")]
    NotConnected { kind: ActionKind },
    #[error("{kind}: switch to network {target} failed: {source}")]
    NetworkSwitch {
        kind: ActionKind,
        target: NetworkId,
        source: WalletError,
    },
    #[error("{kind}: transaction submission failed: {source}")]
    Wallet {
        kind: ActionKind,
        source: WalletError,
    },
    #[error("hosting surface was torn down")]
    TornDown,
}

impl SubmissionError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            SubmissionError::Wallet {
                source: WalletError::UserRejected(_),
                ..
            }
        )
    }
}
