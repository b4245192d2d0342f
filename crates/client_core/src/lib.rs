use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use shared::{
    domain::{Address, NetworkId, TxHash},
    error::{HostError, WalletError},
    protocol::{
        ComposeCastRequest, ConnectorInfo, HostContext, ReadyOptions, ReceiptUpdate,
        RegisterAppResult, SendTransactionRequest, WriteContractRequest,
    },
};

pub mod actions;
pub mod chain;
pub mod compose;
pub mod config;
pub mod embeds;
pub mod error;
pub mod lifetime;
pub mod session;

pub use chain::{AttemptOutcome, ChainActionOrchestrator, FlowPhase, TransactionFlow, WalletStatus};
pub use compose::CastComposer;
pub use config::MiniAppConfig;
pub use lifetime::Lifetime;
pub use session::{RegisterOutcome, SessionController, SessionState, SessionStatus};

/// Capabilities of the embedding host's mini-app SDK.
#[async_trait]
pub trait HostSdk: Send + Sync {
    async fn ready(&self, options: ReadyOptions) -> Result<(), HostError>;
    async fn context(&self) -> Result<HostContext, HostError>;
    async fn register_app(&self) -> Result<RegisterAppResult, HostError>;
    async fn compose_cast(&self, request: ComposeCastRequest) -> Result<(), HostError>;
}

/// The single active wallet connection.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn connectors(&self) -> Vec<ConnectorInfo>;
    async fn connect(&self, connector: &str) -> Result<(), WalletError>;
    async fn disconnect(&self) -> Result<(), WalletError>;
    fn current_connector(&self) -> Option<String>;
    fn current_address(&self) -> Option<Address>;
    fn current_network_id(&self) -> Option<NetworkId>;
    async fn switch_network(&self, target: NetworkId) -> Result<(), WalletError>;
    async fn send_transaction(&self, request: SendTransactionRequest)
        -> Result<TxHash, WalletError>;
    async fn write_contract(&self, request: WriteContractRequest) -> Result<TxHash, WalletError>;
    /// Status notifications for `hash`. May repeat entries, may end without a terminal one.
    fn wait_for_receipt(&self, hash: &TxHash) -> BoxStream<'static, ReceiptUpdate>;
}

/// The three orchestration components wired over one shared lifetime.
pub struct MiniApp {
    pub session: Arc<SessionController>,
    pub composer: Arc<CastComposer>,
    pub chain: Arc<ChainActionOrchestrator>,
    lifetime: Lifetime,
}

impl MiniApp {
    pub fn new(
        config: &MiniAppConfig,
        host: Arc<dyn HostSdk>,
        wallet: Arc<dyn WalletConnector>,
    ) -> Self {
        let lifetime = Lifetime::new();
        let session = Arc::new(SessionController::new(
            host,
            config.settle_delay,
            lifetime.clone(),
        ));
        let composer = Arc::new(CastComposer::new(
            Arc::clone(&session),
            config.canonical_url.clone(),
        ));
        let chain = Arc::new(ChainActionOrchestrator::new(
            wallet,
            Arc::clone(&composer),
            config.mint.clone(),
            config.donate.clone(),
            lifetime.clone(),
        ));

        Self {
            session,
            composer,
            chain,
            lifetime,
        }
    }

    /// Marks the hosting surface as gone. In-flight calls keep running but write nothing.
    pub fn tear_down(&self) {
        self.lifetime.tear_down();
    }

    pub fn is_torn_down(&self) -> bool {
        !self.lifetime.is_alive()
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
