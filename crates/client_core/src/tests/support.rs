use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use shared::{
    domain::{Address, Fid, NetworkId, TxHash},
    error::{HostError, WalletError},
    protocol::{
        ComposeCastRequest, ConnectorInfo, HostContext, HostUser, ReadyOptions, ReceiptUpdate,
        RegisterAppResult, SendTransactionRequest, WriteContractRequest,
    },
};
use tokio::sync::Notify;

use crate::{
    config::{MiniAppConfig, Settings},
    HostSdk, WalletConnector,
};

pub(crate) const CANONICAL: &str = "https://hellobase.vercel.app/";
pub(crate) const MINT_CONTRACT: &str = "0x1111111111111111111111111111111111111111";
pub(crate) const DONATE_RECIPIENT: &str = "0x2222222222222222222222222222222222222222";
pub(crate) const WALLET_ADDRESS: &str = "0x3333333333333333333333333333333333333333";

pub(crate) fn test_settings() -> Settings {
    Settings {
        mint_contract: Some(MINT_CONTRACT.to_string()),
        donate_recipient: Some(DONATE_RECIPIENT.to_string()),
        ..Settings::default()
    }
}

pub(crate) fn test_config() -> MiniAppConfig {
    MiniAppConfig::from_settings(&test_settings()).expect("test config")
}

pub(crate) fn hash(n: u64) -> TxHash {
    format!("0x{n:064x}").parse().expect("hash")
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Default)]
pub(crate) struct FakeHost {
    user: Option<HostUser>,
    ready_error: Option<HostError>,
    context_error: Option<HostError>,
    register_error: Option<HostError>,
    compose_error: Option<HostError>,
    ready_gate: Option<Arc<Notify>>,
    pub ready_calls: AtomicUsize,
    pub context_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub composed: Mutex<Vec<ComposeCastRequest>>,
}

impl FakeHost {
    pub(crate) fn signed_in(fid: u64) -> Self {
        Self {
            user: Some(HostUser {
                fid: Fid(fid),
                username: Some("alice".to_string()),
                display_name: Some("Alice".to_string()),
            }),
            ..Self::default()
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn with_ready_error(mut self, err: HostError) -> Self {
        self.ready_error = Some(err);
        self
    }

    pub(crate) fn with_context_error(mut self, err: HostError) -> Self {
        self.context_error = Some(err);
        self
    }

    pub(crate) fn with_register_error(mut self, err: HostError) -> Self {
        self.register_error = Some(err);
        self
    }

    pub(crate) fn with_compose_error(mut self, err: HostError) -> Self {
        self.compose_error = Some(err);
        self
    }

    /// `ready` blocks until the gate is notified.
    pub(crate) fn with_ready_gate(mut self, gate: Arc<Notify>) -> Self {
        self.ready_gate = Some(gate);
        self
    }

    pub(crate) fn calls(&self) -> (usize, usize, usize) {
        (
            self.ready_calls.load(Ordering::SeqCst),
            self.context_calls.load(Ordering::SeqCst),
            self.register_calls.load(Ordering::SeqCst),
        )
    }

    pub(crate) fn composed(&self) -> Vec<ComposeCastRequest> {
        self.composed.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostSdk for FakeHost {
    async fn ready(&self, options: ReadyOptions) -> Result<(), HostError> {
        assert!(options.disable_native_gestures);
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.ready_gate {
            gate.notified().await;
        }
        match &self.ready_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn context(&self) -> Result<HostContext, HostError> {
        self.context_calls.fetch_add(1, Ordering::SeqCst);
        match &self.context_error {
            Some(err) => Err(err.clone()),
            None => Ok(HostContext {
                user: self.user.clone(),
            }),
        }
    }

    async fn register_app(&self) -> Result<RegisterAppResult, HostError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        match &self.register_error {
            Some(err) => Err(err.clone()),
            None => Ok(RegisterAppResult::default()),
        }
    }

    async fn compose_cast(&self, request: ComposeCastRequest) -> Result<(), HostError> {
        self.composed.lock().unwrap().push(request);
        match &self.compose_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub(crate) struct FakeWallet {
    connectors: Vec<ConnectorInfo>,
    connected: Mutex<Option<String>>,
    network: Mutex<Option<NetworkId>>,
    switch_applies: bool,
    switch_error: Option<WalletError>,
    transfer_error: Mutex<Option<WalletError>>,
    contract_error: Mutex<Option<WalletError>>,
    next_hash: AtomicUsize,
    receipts: Mutex<HashMap<TxHash, Vec<ReceiptUpdate>>>,
    pub switch_requests: Mutex<Vec<NetworkId>>,
    pub transfers: Mutex<Vec<SendTransactionRequest>>,
    pub contract_calls: Mutex<Vec<WriteContractRequest>>,
}

impl FakeWallet {
    /// Connected through "injected" on `network`.
    pub(crate) fn on_network(network: NetworkId) -> Self {
        Self {
            connectors: vec![
                ConnectorInfo {
                    name: "injected".to_string(),
                    ready: true,
                },
                ConnectorInfo {
                    name: "walletConnect".to_string(),
                    ready: false,
                },
            ],
            connected: Mutex::new(Some("injected".to_string())),
            network: Mutex::new(Some(network)),
            switch_applies: false,
            switch_error: None,
            transfer_error: Mutex::new(None),
            contract_error: Mutex::new(None),
            next_hash: AtomicUsize::new(1),
            receipts: Mutex::new(HashMap::new()),
            switch_requests: Mutex::new(Vec::new()),
            transfers: Mutex::new(Vec::new()),
            contract_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn disconnected() -> Self {
        let wallet = Self::on_network(NetworkId::BASE);
        *wallet.connected.lock().unwrap() = None;
        *wallet.network.lock().unwrap() = None;
        wallet
    }

    /// `switch_network` moves the wallet to the requested network.
    pub(crate) fn switching(mut self) -> Self {
        self.switch_applies = true;
        self
    }

    pub(crate) fn with_switch_error(mut self, err: WalletError) -> Self {
        self.switch_error = Some(err);
        self
    }

    pub(crate) fn fail_transfers(&self, err: WalletError) {
        *self.transfer_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_contract_calls(&self, err: WalletError) {
        *self.contract_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn set_network(&self, network: NetworkId) {
        *self.network.lock().unwrap() = Some(network);
    }

    pub(crate) fn script_receipts(&self, hash: &TxHash, updates: Vec<ReceiptUpdate>) {
        self.receipts.lock().unwrap().insert(hash.clone(), updates);
    }

    pub(crate) fn submissions(&self) -> usize {
        self.transfers.lock().unwrap().len() + self.contract_calls.lock().unwrap().len()
    }

    fn issue_hash(&self) -> TxHash {
        hash(self.next_hash.fetch_add(1, Ordering::SeqCst) as u64)
    }
}

#[async_trait]
impl WalletConnector for FakeWallet {
    fn connectors(&self) -> Vec<ConnectorInfo> {
        self.connectors.clone()
    }

    async fn connect(&self, connector: &str) -> Result<(), WalletError> {
        *self.connected.lock().unwrap() = Some(connector.to_string());
        self.network
            .lock()
            .unwrap()
            .get_or_insert(NetworkId::BASE);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        *self.connected.lock().unwrap() = None;
        *self.network.lock().unwrap() = None;
        Ok(())
    }

    fn current_connector(&self) -> Option<String> {
        self.connected.lock().unwrap().clone()
    }

    fn current_address(&self) -> Option<Address> {
        self.connected
            .lock()
            .unwrap()
            .as_ref()
            .map(|_| WALLET_ADDRESS.parse().expect("address"))
    }

    fn current_network_id(&self) -> Option<NetworkId> {
        *self.network.lock().unwrap()
    }

    async fn switch_network(&self, target: NetworkId) -> Result<(), WalletError> {
        self.switch_requests.lock().unwrap().push(target);
        if let Some(err) = &self.switch_error {
            return Err(err.clone());
        }
        if self.switch_applies {
            self.set_network(target);
        }
        Ok(())
    }

    async fn send_transaction(
        &self,
        request: SendTransactionRequest,
    ) -> Result<TxHash, WalletError> {
        if let Some(err) = self.transfer_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.transfers.lock().unwrap().push(request);
        Ok(self.issue_hash())
    }

    async fn write_contract(&self, request: WriteContractRequest) -> Result<TxHash, WalletError> {
        if let Some(err) = self.contract_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.contract_calls.lock().unwrap().push(request);
        Ok(self.issue_hash())
    }

    fn wait_for_receipt(&self, hash: &TxHash) -> BoxStream<'static, ReceiptUpdate> {
        let updates = self
            .receipts
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .unwrap_or_default();
        futures::stream::iter(updates).boxed()
    }
}
