//! Single-route quote returned by `GET /quote`

use evm_wallet::TransactionRequest;
use serde::{Deserialize, Serialize};

use crate::route::de_loose_f64;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeeToken {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// A fee charged along the quoted path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCost {
    #[serde(default)]
    pub name: Option<String>,
    /// Smallest-unit amount of `token`
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default, rename = "amountUSD", deserialize_with = "de_loose_f64")]
    pub amount_usd: Option<f64>,
    #[serde(default)]
    pub token: Option<FeeToken>,
    #[serde(default)]
    pub included: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEstimate {
    /// Expected output, in the destination token's smallest unit
    #[serde(default)]
    pub to_amount: Option<String>,
    #[serde(default)]
    pub to_amount_min: Option<String>,
    #[serde(default, rename = "toAmountUSD", deserialize_with = "de_loose_f64")]
    pub to_amount_usd: Option<f64>,
    #[serde(default, deserialize_with = "de_loose_f64")]
    pub execution_duration: Option<f64>,
    #[serde(default)]
    pub fee_costs: Vec<FeeCost>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub estimate: QuoteEstimate,
    #[serde(default)]
    pub transaction_request: Option<TransactionRequest>,
}

impl Quote {
    /// Sum of the USD fee estimates, `None` when no fee carries one
    pub fn total_fees_usd(&self) -> Option<f64> {
        self.estimate
            .fee_costs
            .iter()
            .filter_map(|f| f.amount_usd)
            .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
    }
}
