//! Route execution through a connected wallet
//!
//! Steps run strictly in order. For each one the engine asks LI.FI for the
//! step's transaction, tops up the ERC-20 allowance when the step spends a
//! token, then has the wallet sign and broadcast it. Execution stops at the
//! first failure; transactions already broadcast stay broadcast.
//!
//! Approvals are not awaited. The wallet signs them with the lower nonce, so
//! they land before the step transaction that needs them.

use async_trait::async_trait;
use dashboard_core::{ChainId, QuoteError};
use evm_wallet::{ProviderError, WalletHandle};
use serde::Serialize;

use crate::allowance::{decode_uint, AbiError, Approval};
use crate::client::LifiClient;
use crate::route::{Route, Step};

/// Hashes of the transactions submitted for a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    pub route_id: Option<String>,
    pub tx_hashes: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Route has no steps")]
    EmptyRoute,

    #[error("Step {step}: no transaction request returned")]
    MissingTransaction { step: usize },

    #[error("Step {step} must be sent on chain {step_chain}, wallet is on chain {wallet_chain}")]
    ChainMismatch {
        step: usize,
        step_chain: ChainId,
        wallet_chain: ChainId,
    },

    #[error("Step {step}: token approval failed: {source}")]
    Approval { step: usize, source: AbiError },

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Wallet(#[from] ProviderError),
}

/// Executes a selected route with a ready wallet
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    async fn execute(
        &self,
        route: &Route,
        wallet: &WalletHandle,
    ) -> Result<ExecutionReceipt, EngineError>;
}

/// Execution engine backed by LI.FI's step transaction endpoint
#[derive(Debug, Clone)]
pub struct LifiExecutionEngine {
    client: LifiClient,
}

impl LifiExecutionEngine {
    pub fn new(client: LifiClient) -> Self {
        Self { client }
    }

    /// Send an `approve` when the step's spender may not move enough of the
    /// source token yet. Returns the approval's hash when one was sent.
    async fn approve_if_needed(
        &self,
        index: usize,
        step: &Step,
        wallet: &WalletHandle,
    ) -> Result<Option<String>, EngineError> {
        let abi = |source: AbiError| EngineError::Approval {
            step: index,
            source,
        };

        let Some(approval) = Approval::for_step(step).map_err(abi)? else {
            return Ok(None);
        };

        let call = approval.allowance_call(wallet.address()).map_err(abi)?;
        let raw = wallet.provider().call_contract(&call).await?;
        let current = decode_uint(&raw).map_err(abi)?;
        if current >= approval.amount {
            tracing::debug!(step = index, token = %approval.token, "Allowance already sufficient");
            return Ok(None);
        }

        let tx = approval
            .approve_transaction(wallet.address(), wallet.chain_id())
            .map_err(abi)?;
        let hash = wallet.provider().send_transaction(&tx).await?;
        tracing::info!(
            step = index,
            token = %approval.token,
            spender = %approval.spender,
            tx_hash = %hash,
            "Submitted token approval"
        );
        Ok(Some(hash))
    }
}

#[async_trait]
impl ExecutionEngine for LifiExecutionEngine {
    async fn execute(
        &self,
        route: &Route,
        wallet: &WalletHandle,
    ) -> Result<ExecutionReceipt, EngineError> {
        if route.steps.is_empty() {
            return Err(EngineError::EmptyRoute);
        }

        let mut tx_hashes = Vec::with_capacity(route.steps.len());

        for (index, step) in route.steps.iter().enumerate() {
            let mut populated = self.client.step_transaction(step).await?;
            let mut tx = populated
                .transaction_request
                .take()
                .ok_or(EngineError::MissingTransaction { step: index })?;

            if let Some(chain) = tx.chain_id.or_else(|| step.from_chain_id()) {
                if chain != wallet.chain_id() {
                    return Err(EngineError::ChainMismatch {
                        step: index,
                        step_chain: chain,
                        wallet_chain: wallet.chain_id(),
                    });
                }
            }

            if let Some(hash) = self.approve_if_needed(index, &populated, wallet).await? {
                tx_hashes.push(hash);
            }

            tx.from = Some(wallet.address().to_string());

            let hash = wallet.provider().send_transaction(&tx).await?;
            tracing::info!(
                step = index,
                tool = step.tool.as_deref().unwrap_or("unknown"),
                tx_hash = %hash,
                "Submitted route step"
            );
            tx_hashes.push(hash);
        }

        Ok(ExecutionReceipt {
            route_id: route.id.clone(),
            tx_hashes,
        })
    }
}
