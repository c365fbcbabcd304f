//! Wallet provider capability

use async_trait::async_trait;
use dashboard_core::ChainId;
use serde::{Deserialize, Serialize};

/// EIP-1193 error code: user rejected the request
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-3326 error code: chain not added to the wallet
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
/// JSON-RPC error code: method not found
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Errors returned by a wallet provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("User rejected the request: {0}")]
    UserRejected(String),

    #[error("Chain not recognized by wallet: {0}")]
    UnrecognizedChain(String),

    #[error("Wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Wallet unreachable: {0}")]
    Transport(String),

    #[error("Unexpected wallet response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Map a JSON-RPC error object to a provider error
    pub fn from_rpc(code: i64, message: String) -> Self {
        match code {
            USER_REJECTED_CODE => Self::UserRejected(message),
            UNRECOGNIZED_CHAIN_CODE => Self::UnrecognizedChain(message),
            _ => Self::Rpc { code, message },
        }
    }
}

/// Transaction to be signed and broadcast by the wallet.
///
/// Mirrors the `transactionRequest` object returned by the route service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(default, alias = "gas", skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
}

/// Capabilities a connected wallet exposes to the dashboard.
///
/// Every call is a single request with one definite completion; none of them
/// can be aborted once issued.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user for account access (`eth_requestAccounts`)
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Currently active chain (`eth_chainId`)
    async fn chain_id(&self) -> Result<ChainId, ProviderError>;

    /// Ask the wallet to switch networks (`wallet_switchEthereumChain`)
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ProviderError>;

    /// Sign and broadcast a transaction, returning its hash (`eth_sendTransaction`)
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, ProviderError>;

    /// Read-only contract call against the latest block (`eth_call`), returning
    /// the raw hex result
    async fn call_contract(&self, _tx: &TransactionRequest) -> Result<String, ProviderError> {
        Err(ProviderError::Rpc {
            code: METHOD_NOT_FOUND_CODE,
            message: "eth_call is not supported by this wallet".to_string(),
        })
    }
}
