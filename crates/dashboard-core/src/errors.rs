//! Error types for the dashboard

use thiserror::Error;

use crate::ChainId;

/// A user-entered amount that cannot be converted to smallest units
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid amount '{input}': {reason}")]
pub struct InvalidAmount {
    pub input: String,
    pub reason: String,
}

impl InvalidAmount {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Route index outside the current route list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No route at index {index} ({len} available)")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

/// Quote/route service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("Quote service unreachable: {0}")]
    Network(String),

    #[error("Quote service error: {0}")]
    Upstream(String),
}

/// Wallet connection errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("No wallet found (MetaMask/Rabby)")]
    NotFound,

    #[error("Wallet request rejected: {0}")]
    Rejected(String),

    #[error("Please switch to chain {chain_id} manually.")]
    ChainSwitchFailed { chain_id: ChainId },
}

/// Route execution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Execution failed: {0}")]
    Failed(String),
}

/// Errors surfaced by the bridge workflow
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Amount(#[from] InvalidAmount),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Selection(#[from] IndexOutOfRange),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Another request is still in progress")]
    Busy,

    #[error("Request was interrupted before it finished")]
    Cancelled,

    #[error("Invalid input: {reason}")]
    InvalidForm { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, Error>;

impl QuoteError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "quote_network",
            Self::Upstream(_) => "quote_upstream",
        }
    }
}

impl WalletError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "wallet_not_found",
            Self::Rejected(_) => "wallet_rejected",
            Self::ChainSwitchFailed { .. } => "chain_switch_failed",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 424,
            Self::Rejected(_) => 403,
            Self::ChainSwitchFailed { .. } => 409,
        }
    }
}

impl Error {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Amount(_) => "invalid_amount",
            Self::Quote(e) => e.error_code(),
            Self::Selection(_) => "index_out_of_range",
            Self::Wallet(e) => e.error_code(),
            Self::Execution(_) => "execution_failed",
            Self::Busy => "busy",
            Self::Cancelled => "cancelled",
            Self::InvalidForm { .. } => "invalid_form",
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Amount(_) | Self::Selection(_) | Self::InvalidForm { .. } => 400,
            Self::Quote(_) | Self::Execution(_) => 502,
            Self::Wallet(e) => e.status_code(),
            Self::Busy => 409,
            Self::Cancelled | Self::Config(_) | Self::Serialization(_) => 500,
        }
    }
}
