use std::sync::Arc;

use shared::protocol::ComposeCastRequest;
use tracing::{error, info, warn};

use crate::{
    embeds::{normalize_embeds, MAX_EMBEDS},
    error::ComposeError,
    session::{SessionController, SessionStatus},
};

pub struct CastComposer {
    session: Arc<SessionController>,
    canonical_url: String,
}

impl CastComposer {
    pub fn new(session: Arc<SessionController>, canonical_url: impl Into<String>) -> Self {
        Self {
            session,
            canonical_url: canonical_url.into(),
        }
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    /// Opens the host's native composer once. Preconditions are read at call time.
    pub async fn compose_cast(&self, text: &str, embeds: &[String]) -> Result<(), ComposeError> {
        let session = self.session.snapshot();
        if session.status != SessionStatus::Loaded {
            warn!("compose: rejected, host sdk status={:?}", session.status);
            return Err(ComposeError::NotReady);
        }
        if session.identity.is_anonymous() {
            warn!("compose: rejected, no signed-in host user");
            return Err(ComposeError::Unauthenticated);
        }

        let normalized = normalize_embeds(&self.canonical_url, embeds);
        if !normalized.dropped().is_empty() {
            warn!(
                "compose: host accepts at most {MAX_EMBEDS} embeds, dropped {}",
                normalized.dropped().len()
            );
        }

        let request = ComposeCastRequest {
            text: text.to_string(),
            embeds: normalized.into_host_embeds(),
        };
        info!(
            "compose: opening composer fid={} embeds={}",
            session.identity.fid,
            request.embeds.as_ref().map_or(0, Vec::len)
        );

        self.session
            .host()
            .compose_cast(request)
            .await
            .map_err(|err| {
                error!("compose: host failed: {err}");
                ComposeError::from(err)
            })
    }
}

#[cfg(test)]
#[path = "tests/compose_tests.rs"]
mod tests;
