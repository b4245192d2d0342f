use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use serde::Serialize;
use shared::{
    domain::Identity,
    error::HostError,
    protocol::{ReadyOptions, RegisterAppResult},
};
use tokio::sync::{watch, OnceCell};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info, warn};

use crate::{
    error::{InitStage, SessionError},
    lifetime::Lifetime,
    HostSdk,
};

/// Field one host leaves out of its register-app response.
const QUIRK_MISSING_FIELD: &str = "result";
/// How that host surfaces the missing field when it fails inside its own bridge.
const QUIRK_MESSAGE_FRAGMENT: &str = "(reading 'result')";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

impl SessionStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, SessionStatus::Loaded | SessionStatus::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub identity: Identity,
    pub last_error: Option<SessionError>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            identity: Identity::anonymous(),
            last_error: None,
        }
    }
}

/// Result of the best-effort register-app step. None of these change the session status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered(RegisterAppResult),
    /// The known malformed-response failure, downgraded to a warning.
    QuirkSuppressed { message: String },
    Failed { message: String },
}

pub fn is_register_quirk(err: &HostError) -> bool {
    match err {
        HostError::MalformedResponse { field, .. } => field == QUIRK_MISSING_FIELD,
        HostError::Rejected { message } => message.contains(QUIRK_MESSAGE_FRAGMENT),
        HostError::Unavailable { .. } => false,
    }
}

/// Owns the one-shot host handshake and the resulting session state.
pub struct SessionController {
    host: Arc<dyn HostSdk>,
    settle_delay: Duration,
    started: AtomicBool,
    state: watch::Sender<SessionState>,
    register_outcome: OnceCell<RegisterOutcome>,
    lifetime: Lifetime,
}

impl SessionController {
    pub fn new(host: Arc<dyn HostSdk>, settle_delay: Duration, lifetime: Lifetime) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            host,
            settle_delay,
            started: AtomicBool::new(false),
            state,
            register_outcome: OnceCell::new(),
            lifetime,
        }
    }

    pub(crate) fn host(&self) -> &Arc<dyn HostSdk> {
        &self.host
    }

    /// Runs the handshake once per controller lifetime; later calls return the current status.
    pub async fn initialize(&self) -> SessionStatus {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("session: initialize skipped, handshake already started");
            return self.status();
        }

        if !self.write_state(|state| state.status = SessionStatus::Loading) {
            return self.status();
        }

        match self.handshake().await {
            Ok(identity) => {
                info!(
                    "session: loaded fid={} anonymous={}",
                    identity.fid,
                    identity.is_anonymous()
                );
                self.write_state(|state| {
                    state.identity = identity;
                    state.status = SessionStatus::Loaded;
                });
            }
            Err(SessionError::TornDown) => {
                debug!("session: torn down mid-handshake, discarding result");
            }
            Err(err) => {
                error!("session: initialization failed: {err}");
                self.write_state(|state| {
                    state.last_error = Some(err);
                    state.status = SessionStatus::Error;
                });
            }
        }

        self.status()
    }

    async fn handshake(&self) -> Result<Identity, SessionError> {
        info!("session: ready handshake starting");
        self.host
            .ready(ReadyOptions {
                disable_native_gestures: true,
            })
            .await
            .map_err(|source| SessionError::Initialization {
                stage: InitStage::Ready,
                source,
            })?;
        self.ensure_alive()?;

        if !self.settle_delay.is_zero() {
            debug!(
                "session: settling for {}ms before context fetch",
                self.settle_delay.as_millis()
            );
            tokio::time::sleep(self.settle_delay).await;
            self.ensure_alive()?;
        }

        let context = self
            .host
            .context()
            .await
            .map_err(|source| SessionError::Initialization {
                stage: InitStage::Context,
                source,
            })?;
        self.ensure_alive()?;
        debug!("session: context received user_present={}", context.user.is_some());

        let outcome = self.register_app().await;
        self.ensure_alive()?;
        let _ = self.register_outcome.set(outcome);

        Ok(context
            .user
            .map(|user| user.to_identity())
            .unwrap_or_else(Identity::anonymous))
    }

    async fn register_app(&self) -> RegisterOutcome {
        match self.host.register_app().await {
            Ok(result) => {
                info!("session: register app succeeded");
                RegisterOutcome::Registered(result)
            }
            Err(err) if is_register_quirk(&err) => {
                warn!("session: register app hit known host quirk, continuing: {err}");
                RegisterOutcome::QuirkSuppressed {
                    message: err.message().to_string(),
                }
            }
            Err(err) => {
                error!("session: register app failed, continuing: {err}");
                RegisterOutcome::Failed {
                    message: err.message().to_string(),
                }
            }
        }
    }

    fn ensure_alive(&self) -> Result<(), SessionError> {
        if self.lifetime.is_alive() {
            Ok(())
        } else {
            Err(SessionError::TornDown)
        }
    }

    /// Applies `update` unless the hosting surface is gone. Settled states are final.
    fn write_state(&self, update: impl FnOnce(&mut SessionState)) -> bool {
        if !self.lifetime.is_alive() {
            debug!("session: state write skipped after teardown");
            return false;
        }
        self.state.send_if_modified(|state| {
            if state.status.is_settled() {
                return false;
            }
            update(state);
            true
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    pub fn identity(&self) -> Identity {
        self.state.borrow().identity.clone()
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.state.borrow().last_error.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn register_outcome(&self) -> Option<&RegisterOutcome> {
        self.register_outcome.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn updates(&self) -> WatchStream<SessionState> {
        WatchStream::new(self.state.subscribe())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
