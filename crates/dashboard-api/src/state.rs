//! Application state shared across API handlers

use std::sync::Arc;

use bridge_session::{BridgeSession, RouteExecutor};
use dashboard_core::{AppConfig, Error};
use evm_wallet::WalletBridge;
use lifi::{LifiClient, LifiExecutionEngine, QuoteClient};
use tokio::sync::RwLock;

use crate::dto::WalletView;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    /// Held only for the synchronous begin/finish steps, never across a network call
    session: RwLock<BridgeSession>,
    quotes: Arc<dyn QuoteClient>,
    wallet: WalletBridge,
    executor: RouteExecutor,
}

impl AppState {
    /// Wire up the LI.FI client, execution engine and wallet provider from config
    pub fn from_config(config: AppConfig) -> Result<Self, Error> {
        let lifi = LifiClient::new(config.lifi.clone())
            .map_err(|e| Error::Config(format!("LI.FI client: {}", e)))?;
        let wallet = WalletBridge::from_config(&config.wallet)
            .map_err(|e| Error::Config(format!("wallet provider: {}", e)))?;

        if !wallet.has_provider() {
            tracing::warn!("No wallet RPC configured; route execution will report a missing wallet");
        }

        let executor = RouteExecutor::new(Arc::new(LifiExecutionEngine::new(lifi.clone())));
        Ok(Self::with_parts(config, Arc::new(lifi), wallet, executor))
    }

    /// Assemble from explicit collaborators
    pub fn with_parts(
        config: AppConfig,
        quotes: Arc<dyn QuoteClient>,
        wallet: WalletBridge,
        executor: RouteExecutor,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                session: RwLock::new(BridgeSession::new()),
                quotes,
                wallet,
                executor,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &RwLock<BridgeSession> {
        &self.inner.session
    }

    pub fn quotes(&self) -> &dyn QuoteClient {
        self.inner.quotes.as_ref()
    }

    pub fn wallet(&self) -> &WalletBridge {
        &self.inner.wallet
    }

    pub fn executor(&self) -> &RouteExecutor {
        &self.inner.executor
    }

    /// Current wallet connection for display
    pub async fn wallet_view(&self) -> WalletView {
        let wallet = &self.inner.wallet;
        WalletView::new(wallet.has_provider(), wallet.phase().await, wallet.session().await)
    }
}
