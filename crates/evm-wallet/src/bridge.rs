//! Wallet connect-and-switch protocol
//!
//! `ensure` runs a one-shot sequential state machine:
//!
//! ```text
//! NoProvider --(provider present)--> RequestingAccounts --(granted)--> [chain check]
//!     |                                   |                                 |
//!  NotFound                            Rejected              same chain: Ready
//!                                                            else ConnectedWrongChain
//!                                                                 |--(switched)--> Ready
//!                                                                 `--(failed)----> SwitchFailed
//! ```
//!
//! There is no polling for chain changes made outside the dashboard and no
//! retry after a failed switch; the user is asked to switch manually.

use std::fmt;
use std::sync::Arc;

use dashboard_core::{ChainId, WalletConfig, WalletError};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::json_rpc::JsonRpcWalletProvider;
use crate::provider::{ProviderError, WalletProvider};

/// Last phase reached by the connect protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WalletPhase {
    NoProvider,
    RequestingAccounts,
    ConnectedWrongChain,
    SwitchFailed,
    Ready,
}

impl WalletPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoProvider => "noProvider",
            Self::RequestingAccounts => "requestingAccounts",
            Self::ConnectedWrongChain => "connectedWrongChain",
            Self::SwitchFailed => "switchFailed",
            Self::Ready => "ready",
        }
    }
}

/// Connected wallet: address and last known active chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub address: String,
    /// `None` when the wallet did not report its chain
    pub chain_id: Option<ChainId>,
}

/// Proof that a wallet is connected and on the required chain.
///
/// Only [`WalletBridge::ensure`] creates handles.
#[derive(Clone)]
pub struct WalletHandle {
    address: String,
    chain_id: ChainId,
    provider: Arc<dyn WalletProvider>,
}

impl WalletHandle {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn provider(&self) -> &dyn WalletProvider {
        self.provider.as_ref()
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletHandle")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

struct BridgeState {
    phase: WalletPhase,
    session: Option<WalletSession>,
}

/// Ensures a connected wallet on the required chain before execution
pub struct WalletBridge {
    provider: Option<Arc<dyn WalletProvider>>,
    state: RwLock<BridgeState>,
    /// Serializes `ensure` calls; provider requests cannot be aborted
    ensure_lock: Mutex<()>,
}

impl WalletBridge {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            state: RwLock::new(BridgeState {
                phase: WalletPhase::NoProvider,
                session: None,
            }),
            ensure_lock: Mutex::new(()),
        }
    }

    /// Build from config; no RPC URL means no wallet provider
    pub fn from_config(config: &WalletConfig) -> Result<Self, ProviderError> {
        let provider = match &config.rpc_url {
            Some(url) => {
                tracing::info!("Using wallet JSON-RPC endpoint {}", url);
                Some(Arc::new(JsonRpcWalletProvider::new(url.clone())?) as Arc<dyn WalletProvider>)
            }
            None => None,
        };
        Ok(Self::new(provider))
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn phase(&self) -> WalletPhase {
        self.state.read().await.phase
    }

    pub async fn session(&self) -> Option<WalletSession> {
        self.state.read().await.session.clone()
    }

    async fn set_phase(&self, phase: WalletPhase) {
        self.state.write().await.phase = phase;
    }

    /// Connect the wallet and make sure it is on `required_chain_id`.
    pub async fn ensure(&self, required_chain_id: ChainId) -> Result<WalletHandle, WalletError> {
        let _guard = self.ensure_lock.lock().await;

        let Some(provider) = self.provider.clone() else {
            self.set_phase(WalletPhase::NoProvider).await;
            return Err(WalletError::NotFound);
        };

        self.set_phase(WalletPhase::RequestingAccounts).await;
        let accounts = provider.request_accounts().await.map_err(|e| {
            tracing::warn!("Wallet account request failed: {}", e);
            WalletError::Rejected(e.to_string())
        })?;
        let address = accounts
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::Rejected("No accounts authorized".to_string()))?;

        let current_chain = match provider.chain_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!("Could not read wallet chain, switching anyway: {}", e);
                None
            }
        };

        {
            let mut state = self.state.write().await;
            state.session = Some(WalletSession {
                address: address.clone(),
                chain_id: current_chain,
            });
        }

        if current_chain != Some(required_chain_id) {
            self.set_phase(WalletPhase::ConnectedWrongChain).await;
            tracing::info!(
                from = ?current_chain,
                to = required_chain_id,
                "Requesting wallet chain switch"
            );

            if let Err(e) = provider.switch_chain(required_chain_id).await {
                tracing::warn!("Wallet chain switch to {} failed: {}", required_chain_id, e);
                self.set_phase(WalletPhase::SwitchFailed).await;
                return Err(WalletError::ChainSwitchFailed {
                    chain_id: required_chain_id,
                });
            }
        }

        {
            let mut state = self.state.write().await;
            state.session = Some(WalletSession {
                address: address.clone(),
                chain_id: Some(required_chain_id),
            });
            state.phase = WalletPhase::Ready;
        }

        tracing::info!(address = %address, chain_id = required_chain_id, "Wallet ready");

        Ok(WalletHandle {
            address,
            chain_id: required_chain_id,
            provider,
        })
    }
}
