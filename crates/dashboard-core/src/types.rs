//! Core type definitions for the dashboard

use serde::{Deserialize, Serialize};
use std::fmt;

/// EVM chain ID (EIP-155)
pub type ChainId = u64;

/// Number of fractional digits of a token's smallest on-chain unit
pub type TokenDecimals = u32;

/// Token contract address (`0x` + 40 hex chars), or the zero address for the native coin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAddress(pub String);

impl TokenAddress {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn native() -> Self {
        Self(constants::NATIVE_TOKEN_ADDRESS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the native coin placeholder (zero address)
    pub fn is_native(&self) -> bool {
        self.0.eq_ignore_ascii_case(constants::NATIVE_TOKEN_ADDRESS)
    }

    /// Check for a `0x`-prefixed 20-byte hex address
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix("0x")
            .filter(|body| body.len() == 40)
            .and_then(|body| hex::decode(body).ok())
            .is_some()
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer amount in a token's smallest unit, as decimal digits (e.g. wei)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SmallestUnitAmount(String);

impl SmallestUnitAmount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }
}

impl From<num_bigint::BigUint> for SmallestUnitAmount {
    fn from(value: num_bigint::BigUint) -> Self {
        Self(value.to_str_radix(10))
    }
}

impl fmt::Display for SmallestUnitAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chain offered in the bridge form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainInfo {
    pub id: ChainId,
    pub label: &'static str,
}

/// Chains offered for bridging
pub const SUPPORTED_CHAINS: &[ChainInfo] = &[
    ChainInfo { id: 1, label: "Ethereum" },
    ChainInfo { id: 137, label: "Polygon" },
    ChainInfo { id: 42161, label: "Arbitrum" },
    ChainInfo { id: 10, label: "Optimism" },
    ChainInfo { id: 8453, label: "Base" },
];

/// Display label for a chain ID
pub fn chain_label(id: ChainId) -> Option<&'static str> {
    SUPPORTED_CHAINS
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.label)
}

/// Constants
pub mod constants {
    use super::{ChainId, TokenDecimals};

    /// Placeholder address for a chain's native coin
    pub const NATIVE_TOKEN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

    /// USDC (PoS) on Polygon
    pub const USDC_POLYGON: &str = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";

    pub const ETHEREUM_CHAIN_ID: ChainId = 1;
    pub const POLYGON_CHAIN_ID: ChainId = 137;

    /// Decimals of ETH and most EVM native coins
    pub const NATIVE_DECIMALS: TokenDecimals = 18;

    /// Largest scale whose unit amount (`10^d`) still fits in a uint256
    pub const MAX_TOKEN_DECIMALS: TokenDecimals = 77;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_address_checks() {
        assert!(TokenAddress::native().is_native());
        assert!(TokenAddress::native().is_well_formed());

        let usdc = TokenAddress::new(constants::USDC_POLYGON);
        assert!(usdc.is_well_formed());
        assert!(!usdc.is_native());

        assert!(!TokenAddress::new("0x2791").is_well_formed());
        assert!(!TokenAddress::new("USDC").is_well_formed());
        assert!(!TokenAddress::new("0xZZ91Bca1f2de4661ED88A30C99A7a9449Aa84174").is_well_formed());
    }

    #[test]
    fn test_chain_labels() {
        assert_eq!(chain_label(137), Some("Polygon"));
        assert_eq!(chain_label(8453), Some("Base"));
        assert_eq!(chain_label(56), None);
    }

    #[test]
    fn test_smallest_unit_zero() {
        let zero = SmallestUnitAmount::from(num_bigint::BigUint::from(0u32));
        assert_eq!(zero.as_str(), "0");
        assert!(zero.is_zero());
    }
}
