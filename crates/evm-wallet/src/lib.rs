//! evm-wallet: EVM wallet access for route execution
//!
//! Wraps an EIP-1193 wallet (account access, chain switching, transaction
//! submission) behind the [`WalletProvider`] trait and drives the one-shot
//! connect-and-switch protocol in [`WalletBridge`].

pub mod bridge;
pub mod json_rpc;
pub mod provider;

pub use bridge::{WalletBridge, WalletHandle, WalletPhase, WalletSession};
pub use json_rpc::JsonRpcWalletProvider;
pub use provider::{ProviderError, TransactionRequest, WalletProvider};
