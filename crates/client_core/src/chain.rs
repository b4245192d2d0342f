use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use shared::{
    domain::{ActionKind, Address, NetworkId, TxHash},
    error::WalletError,
    protocol::{ConnectorInfo, ReceiptUpdate},
};
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info, warn};

use crate::{
    actions::{ActionRequest, ActionTarget},
    compose::CastComposer,
    error::SubmissionError,
    lifetime::Lifetime,
    WalletConnector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    #[default]
    Idle,
    NetworkMismatch,
    Pending,
    Confirming,
    Confirmed,
    Failed,
}

/// Lifecycle of the latest attempt for one action kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TransactionFlow {
    pub phase: FlowPhase,
    pub hash: Option<TxHash>,
    pub pending: bool,
    pub confirming: bool,
    pub confirmed: bool,
    pub failure_reason: Option<String>,
    pub confirmations: u32,
    pub submitted_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl TransactionFlow {
    fn network_mismatch() -> Self {
        Self {
            phase: FlowPhase::NetworkMismatch,
            ..Self::default()
        }
    }

    /// Fresh attempt awaiting a hash from the wallet.
    fn submitting() -> Self {
        Self {
            phase: FlowPhase::Pending,
            pending: true,
            ..Self::default()
        }
    }

    fn failed(mut self, reason: String) -> Self {
        self.phase = FlowPhase::Failed;
        self.pending = false;
        self.confirming = false;
        self.failure_reason = Some(reason);
        self.settled_at = Some(Utc::now());
        self
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, FlowPhase::Pending | FlowPhase::Confirming)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, FlowPhase::Confirmed | FlowPhase::Failed)
    }

    /// Applies a watcher notification for the flow's own hash. Settled flows ignore everything.
    fn apply(&mut self, update: &ReceiptUpdate) -> bool {
        if self.is_settled() {
            return false;
        }
        match update {
            ReceiptUpdate::Pending => {
                if self.phase == FlowPhase::Pending {
                    return false;
                }
                self.phase = FlowPhase::Pending;
                self.pending = true;
                self.confirming = false;
            }
            ReceiptUpdate::Confirming { confirmations } => {
                if self.phase == FlowPhase::Confirming && self.confirmations == *confirmations {
                    return false;
                }
                self.phase = FlowPhase::Confirming;
                self.pending = false;
                self.confirming = true;
                self.confirmations = *confirmations;
            }
            ReceiptUpdate::Confirmed => {
                self.phase = FlowPhase::Confirmed;
                self.pending = false;
                self.confirming = false;
                self.confirmed = true;
                self.settled_at = Some(Utc::now());
            }
            ReceiptUpdate::Failed { reason } => {
                *self = std::mem::take(self).failed(reason.clone());
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Wallet was on the wrong network; a switch was requested and nothing was submitted.
    SwitchRequested {
        from: NetworkId,
        to: NetworkId,
    },
    Submitted(TxHash),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletStatus {
    pub connected: bool,
    pub connector: Option<String>,
    pub address: Option<Address>,
    pub network_id: Option<NetworkId>,
}

struct ActionSlot {
    target: ActionTarget,
    flow: watch::Sender<TransactionFlow>,
    /// Every hash this kind submitted, with the terminal phase its receipts reached.
    submitted: Mutex<HashMap<TxHash, FlowPhase>>,
}

impl ActionSlot {
    fn new(target: ActionTarget) -> Self {
        let (flow, _) = watch::channel(TransactionFlow::default());
        Self {
            target,
            flow,
            submitted: Mutex::new(HashMap::new()),
        }
    }

    /// Records a terminal update for `hash` and reports whether it confirmed.
    /// `None` when this kind never submitted `hash`.
    async fn settle(&self, hash: &TxHash, update: &ReceiptUpdate) -> Option<bool> {
        let mut submitted = self.submitted.lock().await;
        let phase = submitted.get_mut(hash)?;
        if *phase == FlowPhase::Pending {
            match update {
                ReceiptUpdate::Confirmed => *phase = FlowPhase::Confirmed,
                ReceiptUpdate::Failed { .. } => *phase = FlowPhase::Failed,
                ReceiptUpdate::Pending | ReceiptUpdate::Confirming { .. } => {}
            }
        }
        Some(*phase == FlowPhase::Confirmed)
    }
}

/// Drives mint and donate through network check, submission and receipt tracking.
pub struct ChainActionOrchestrator {
    wallet: Arc<dyn WalletConnector>,
    composer: Arc<CastComposer>,
    mint: ActionSlot,
    donate: ActionSlot,
    processed: Mutex<HashSet<TxHash>>,
    lifetime: Lifetime,
}

impl ChainActionOrchestrator {
    pub fn new(
        wallet: Arc<dyn WalletConnector>,
        composer: Arc<CastComposer>,
        mint: ActionTarget,
        donate: ActionTarget,
        lifetime: Lifetime,
    ) -> Self {
        Self {
            wallet,
            composer,
            mint: ActionSlot::new(mint),
            donate: ActionSlot::new(donate),
            processed: Mutex::new(HashSet::new()),
            lifetime,
        }
    }

    fn slot(&self, kind: ActionKind) -> &ActionSlot {
        match kind {
            ActionKind::Mint => &self.mint,
            ActionKind::Donate => &self.donate,
        }
    }

    pub fn required_network(&self, kind: ActionKind) -> NetworkId {
        self.slot(kind).target.network_id
    }

    pub fn flow(&self, kind: ActionKind) -> TransactionFlow {
        self.slot(kind).flow.borrow().clone()
    }

    pub fn flow_updates(&self, kind: ActionKind) -> WatchStream<TransactionFlow> {
        WatchStream::new(self.slot(kind).flow.subscribe())
    }

    fn set_flow(&self, kind: ActionKind, flow: TransactionFlow) -> bool {
        if !self.lifetime.is_alive() {
            debug!("chain: {kind} flow write skipped after teardown");
            return false;
        }
        self.slot(kind).flow.send_replace(flow);
        true
    }

    fn fail_flow(&self, kind: ActionKind, err: SubmissionError) -> SubmissionError {
        if err.is_user_rejection() {
            info!("chain: {kind} rejected by user: {err}");
        } else {
            error!("chain: {kind} failed: {err}");
        }
        self.set_flow(kind, TransactionFlow::default().failed(err.to_string()));
        err
    }

    pub fn connectors(&self) -> Vec<ConnectorInfo> {
        self.wallet.connectors()
    }

    pub async fn connect(&self, name: &str) -> Result<(), WalletError> {
        let connector = self
            .wallet
            .connectors()
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| WalletError::ConnectorNotFound(name.to_string()))?;
        if !connector.ready {
            return Err(WalletError::ConnectorNotReady(connector.name));
        }
        self.wallet.connect(&connector.name).await?;
        info!("chain: wallet connected connector={}", connector.name);
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<(), WalletError> {
        self.wallet.disconnect().await?;
        info!("chain: wallet disconnected");
        Ok(())
    }

    pub fn wallet_status(&self) -> WalletStatus {
        let address = self.wallet.current_address();
        WalletStatus {
            connected: address.is_some(),
            connector: self.wallet.current_connector(),
            address,
            network_id: self.wallet.current_network_id(),
        }
    }

    /// Submits `kind` if the wallet is on its network, otherwise only requests a switch.
    ///
    /// Re-invoking while a previous attempt is still in flight starts a fresh attempt;
    /// double submission is left to the wallet.
    pub async fn attempt_action(&self, kind: ActionKind) -> Result<AttemptOutcome, SubmissionError> {
        if !self.lifetime.is_alive() {
            return Err(SubmissionError::TornDown);
        }
        let target = &self.slot(kind).target;

        let Some(current) = self.wallet.current_network_id() else {
            return Err(self.fail_flow(kind, SubmissionError::NotConnected { kind }));
        };

        if current != target.network_id {
            info!(
                "chain: {kind} needs network {} but wallet is on {current}, requesting switch",
                target.network_id
            );
            self.set_flow(kind, TransactionFlow::network_mismatch());
            self.wallet
                .switch_network(target.network_id)
                .await
                .map_err(|source| {
                    self.fail_flow(
                        kind,
                        SubmissionError::NetworkSwitch {
                            kind,
                            target: target.network_id,
                            source,
                        },
                    )
                })?;
            return Ok(AttemptOutcome::SwitchRequested {
                from: current,
                to: target.network_id,
            });
        }

        if self.flow(kind).is_in_flight() {
            warn!("chain: {kind} re-attempted while previous attempt is in flight");
        }
        self.set_flow(kind, TransactionFlow::submitting());

        let submitted = match &target.request {
            ActionRequest::Contract(call) => self.wallet.write_contract(call.clone()).await,
            ActionRequest::Transfer(transfer) => {
                self.wallet.send_transaction(transfer.clone()).await
            }
        };
        let hash = submitted.map_err(|source| {
            self.fail_flow(kind, SubmissionError::Wallet { kind, source })
        })?;

        info!("chain: {kind} submitted hash={hash}");
        self.slot(kind)
            .submitted
            .lock()
            .await
            .insert(hash.clone(), FlowPhase::Pending);
        let recorded = self.set_flow(
            kind,
            TransactionFlow {
                phase: FlowPhase::Pending,
                hash: Some(hash.clone()),
                pending: true,
                submitted_at: Some(Utc::now()),
                ..TransactionFlow::default()
            },
        );
        if !recorded {
            return Err(SubmissionError::TornDown);
        }
        Ok(AttemptOutcome::Submitted(hash))
    }

    /// Applies one receipt notification and fires the auto-cast on the first confirmation of `hash`.
    ///
    /// Only hashes submitted by this kind count. A hash whose receipts already failed never casts.
    pub async fn handle_receipt(&self, kind: ActionKind, hash: &TxHash, update: ReceiptUpdate) {
        if !self.lifetime.is_alive() {
            debug!("chain: {kind} receipt for {hash} ignored after teardown");
            return;
        }

        let slot = self.slot(kind);
        let Some(confirmed) = slot.settle(hash, &update).await else {
            warn!("chain: {kind} receipt for unknown hash={hash} ignored");
            return;
        };
        let changed = slot.flow.send_if_modified(|flow| {
            if flow.hash.as_ref() != Some(hash) {
                return false;
            }
            flow.apply(&update)
        });
        if changed {
            debug!("chain: {kind} hash={hash} -> {:?}", slot.flow.borrow().phase);
        } else if slot.flow.borrow().hash.as_ref() != Some(hash) {
            debug!("chain: {kind} receipt for superseded hash={hash}");
        }

        if update == ReceiptUpdate::Confirmed {
            if confirmed {
                self.auto_cast_once(kind, hash).await;
            } else {
                warn!("chain: {kind} confirmation for failed hash={hash} ignored");
            }
        }
    }

    async fn auto_cast_once(&self, kind: ActionKind, hash: &TxHash) {
        let first = self.processed.lock().await.insert(hash.clone());
        if !first {
            debug!("chain: duplicate confirmation for hash={hash} ignored");
            return;
        }

        let cast = self.slot(kind).target.render_cast(hash);
        match self.composer.compose_cast(&cast.text, &cast.embeds).await {
            Ok(()) => info!("chain: auto-cast composed for {kind} hash={hash}"),
            Err(err) => warn!("chain: auto-cast for {kind} hash={hash} failed: {err}"),
        }
    }

    pub async fn is_processed(&self, hash: &TxHash) -> bool {
        self.processed.lock().await.contains(hash)
    }

    /// Feeds the wallet's receipt stream for `hash` into [`Self::handle_receipt`] until it ends.
    pub async fn watch_receipt(&self, kind: ActionKind, hash: TxHash) -> TransactionFlow {
        let mut updates = self.wallet.wait_for_receipt(&hash);
        while let Some(update) = updates.next().await {
            if !self.lifetime.is_alive() {
                debug!("chain: {kind} receipt watch for {hash} abandoned after teardown");
                break;
            }
            self.handle_receipt(kind, &hash, update).await;
        }
        self.flow(kind)
    }

    /// `attempt_action` followed by `watch_receipt` when something was submitted.
    pub async fn run_action(&self, kind: ActionKind) -> Result<AttemptOutcome, SubmissionError> {
        let outcome = self.attempt_action(kind).await?;
        if let AttemptOutcome::Submitted(hash) = &outcome {
            self.watch_receipt(kind, hash.clone()).await;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "tests/chain_tests.rs"]
mod tests;
