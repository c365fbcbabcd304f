//! ERC-20 allowance for steps that spend a token
//!
//! Calldata is ABI-encoded by hand: a 4-byte selector followed by 32-byte
//! words. Only `allowance(address,address)` and `approve(address,uint256)` are
//! needed.

use dashboard_core::{ChainId, TokenAddress};
use evm_wallet::TransactionRequest;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::route::Step;

/// `allowance(address,address)`
const ALLOWANCE_SELECTOR: &str = "dd62ed3e";

/// `approve(address,uint256)`
const APPROVE_SELECTOR: &str = "095ea7b3";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid token amount: {0:?}")]
    InvalidAmount(String),

    #[error("Invalid uint256 return data: {0}")]
    InvalidReturnData(String),
}

/// Token spend a step needs before its transaction can succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub token: String,
    pub spender: String,
    pub amount: BigUint,
}

impl Approval {
    /// `None` for native-token steps and steps without an approval address
    pub fn for_step(step: &Step) -> Result<Option<Self>, AbiError> {
        let (Some(token), Some(spender)) = (step.from_token_address(), step.approval_address())
        else {
            return Ok(None);
        };
        if TokenAddress::new(token).is_native() {
            return Ok(None);
        }

        let raw = step.from_amount().unwrap_or_default();
        let amount = BigUint::parse_bytes(raw.trim().as_bytes(), 10)
            .ok_or_else(|| AbiError::InvalidAmount(raw.to_string()))?;

        Ok(Some(Self {
            token: token.to_string(),
            spender: spender.to_string(),
            amount,
        }))
    }

    /// Read-only `allowance(owner, spender)` call on the token contract
    pub fn allowance_call(&self, owner: &str) -> Result<TransactionRequest, AbiError> {
        let data = format!(
            "0x{}{}{}",
            ALLOWANCE_SELECTOR,
            encode_address(owner)?,
            encode_address(&self.spender)?
        );
        Ok(self.token_call(None, data, None))
    }

    /// `approve(spender, amount)` for exactly the step's amount
    pub fn approve_transaction(
        &self,
        owner: &str,
        chain_id: ChainId,
    ) -> Result<TransactionRequest, AbiError> {
        let data = format!(
            "0x{}{}{}",
            APPROVE_SELECTOR,
            encode_address(&self.spender)?,
            encode_uint(&self.amount)
        );
        Ok(self.token_call(Some(owner.to_string()), data, Some(chain_id)))
    }

    fn token_call(
        &self,
        from: Option<String>,
        data: String,
        chain_id: Option<ChainId>,
    ) -> TransactionRequest {
        TransactionRequest {
            from,
            to: self.token.clone(),
            data: Some(data),
            value: None,
            chain_id,
            gas_price: None,
            gas_limit: None,
        }
    }
}

fn encode_address(address: &str) -> Result<String, AbiError> {
    let invalid = || AbiError::InvalidAddress(address.to_string());
    let digits = address.strip_prefix("0x").ok_or_else(invalid)?;
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    if bytes.len() != 20 {
        return Err(invalid());
    }
    Ok(format!("{:0>64}", hex::encode(bytes)))
}

fn encode_uint(value: &BigUint) -> String {
    format!("{:0>64}", value.to_str_radix(16))
}

/// Decode a uint256 return value; empty data (`0x`) reads as zero
pub fn decode_uint(raw: &str) -> Result<BigUint, AbiError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| AbiError::InvalidReturnData(raw.to_string()))
}
