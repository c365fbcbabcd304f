//! Bridge form input

use dashboard_core::constants::{
    ETHEREUM_CHAIN_ID, NATIVE_DECIMALS, POLYGON_CHAIN_ID, USDC_POLYGON,
};
use dashboard_core::{to_smallest_unit, ChainId, Error, InvalidAmount, TokenAddress, TokenDecimals};
use lifi::{jumper_swap_url, QuoteRequest};
use serde::{Deserialize, Serialize};

/// What the user wants to bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeForm {
    pub from_chain: ChainId,
    pub to_chain: ChainId,
    pub from_token: TokenAddress,
    pub to_token: TokenAddress,
    /// Human-readable amount as typed
    pub amount: String,
    pub from_token_decimals: TokenDecimals,
}

impl Default for BridgeForm {
    /// 0.1 ETH on Ethereum to USDC on Polygon
    fn default() -> Self {
        Self {
            from_chain: ETHEREUM_CHAIN_ID,
            to_chain: POLYGON_CHAIN_ID,
            from_token: TokenAddress::native(),
            to_token: TokenAddress::new(USDC_POLYGON),
            amount: "0.1".to_string(),
            from_token_decimals: NATIVE_DECIMALS,
        }
    }
}

impl BridgeForm {
    /// Check the form and build the route request from it
    pub fn validate(&self) -> Result<QuoteRequest, Error> {
        if self.from_chain == 0 || self.to_chain == 0 {
            return Err(Error::InvalidForm {
                reason: "chain id must be non-zero".to_string(),
            });
        }
        if self.from_token.as_str().trim().is_empty() || self.to_token.as_str().trim().is_empty() {
            return Err(Error::InvalidForm {
                reason: "token address is required".to_string(),
            });
        }

        let from_amount = to_smallest_unit(&self.amount, self.from_token_decimals)?;
        if from_amount.is_zero() {
            return Err(InvalidAmount::new(&self.amount, "amount must be greater than zero").into());
        }

        Ok(QuoteRequest {
            from_chain_id: self.from_chain,
            to_chain_id: self.to_chain,
            from_token_address: self.from_token.clone(),
            to_token_address: self.to_token.clone(),
            from_amount,
        })
    }

    /// Same swap on jumper.exchange
    pub fn jumper_url(&self) -> String {
        jumper_swap_url(
            &self.from_token,
            self.from_chain,
            &self.to_token,
            self.to_chain,
            self.amount.trim(),
        )
    }
}
