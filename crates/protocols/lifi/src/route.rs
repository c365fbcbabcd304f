//! Route and step types returned by `/advanced/routes`
//!
//! Only the fields the dashboard reads are typed. Steps keep every other field
//! so they can be posted back to `/advanced/stepTransaction` unchanged.
//!
//! USD values arrive as decimal strings (`"12.34"`) in most responses but as
//! numbers in some; both are accepted and anything unparseable reads as absent.

use dashboard_core::ChainId;
use evm_wallet::TransactionRequest;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

pub(crate) fn de_loose_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
        Other(Value),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(n)) => Some(n),
        Some(Loose::Text(s)) => s.trim().parse().ok(),
        Some(Loose::Other(_)) | None => None,
    })
}

/// Route-level fee summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteFees {
    #[serde(
        default,
        rename = "totalFeesInUsd",
        deserialize_with = "de_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_fees_in_usd: Option<f64>,
}

/// Route-level estimate block (older response shape)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteEstimate {
    #[serde(
        default,
        rename = "fromAmountUSD",
        deserialize_with = "de_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub from_amount_usd: Option<f64>,
    #[serde(
        default,
        rename = "toAmountUSD",
        deserialize_with = "de_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub to_amount_usd: Option<f64>,
    /// Seconds
    #[serde(
        default,
        rename = "executionDuration",
        deserialize_with = "de_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What a step moves, and between which chains
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_token: Option<StepToken>,
    /// Smallest units of `from_token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_amount: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEstimate {
    /// Kept as the raw JSON number so it round-trips exactly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_duration: Option<Number>,
    /// Contract that must be allowed to spend `action.fromToken`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One bridge or swap hop of a route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<StepAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<StepEstimate>,
    /// Present only after `/advanced/stepTransaction`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_request: Option<TransactionRequest>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    /// Chain the step's transaction must be sent on
    pub fn from_chain_id(&self) -> Option<ChainId> {
        self.action.as_ref().and_then(|a| a.from_chain_id)
    }

    pub fn from_token_address(&self) -> Option<&str> {
        self.action.as_ref()?.from_token.as_ref()?.address.as_deref()
    }

    pub fn from_amount(&self) -> Option<&str> {
        self.action.as_ref()?.from_amount.as_deref()
    }

    pub fn approval_address(&self) -> Option<&str> {
        self.estimate.as_ref()?.approval_address.as_deref()
    }
}

/// A candidate way to move value from one chain/token to another
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_amount: Option<String>,
    #[serde(
        default,
        rename = "fromAmountUSD",
        deserialize_with = "de_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub from_amount_usd: Option<f64>,
    #[serde(
        default,
        rename = "toAmountUSD",
        deserialize_with = "de_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub to_amount_usd: Option<f64>,
    #[serde(
        default,
        rename = "gasCostUSD",
        deserialize_with = "de_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub gas_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<RouteFees>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<RouteEstimate>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Route {
    /// Gas cost, falling back to the total fees figure
    pub fn gas_usd(&self) -> Option<f64> {
        self.gas_cost_usd
            .or_else(|| self.fees.as_ref().and_then(|f| f.total_fees_in_usd))
    }

    pub fn from_usd(&self) -> Option<f64> {
        self.from_amount_usd
            .or_else(|| self.estimate.as_ref().and_then(|e| e.from_amount_usd))
    }

    pub fn to_usd(&self) -> Option<f64> {
        self.to_amount_usd
            .or_else(|| self.estimate.as_ref().and_then(|e| e.to_amount_usd))
    }

    /// Estimated duration in seconds; the sum of the step estimates when the
    /// route carries none itself, `0` when nothing is known
    pub fn execution_duration(&self) -> f64 {
        if let Some(d) = self.estimate.as_ref().and_then(|e| e.execution_duration) {
            return d;
        }
        self.steps
            .iter()
            .filter_map(|s| s.estimate.as_ref()?.execution_duration.as_ref()?.as_f64())
            .sum()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Bridges and exchanges used, in step order
    pub fn tools(&self) -> Vec<&str> {
        self.steps.iter().filter_map(|s| s.tool.as_deref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usd_fields_accept_strings_and_numbers() {
        let route: Route = serde_json::from_value(json!({
            "id": "r1",
            "fromAmountUSD": "250.10",
            "toAmountUSD": 249.5,
            "gasCostUSD": "not a number",
            "steps": []
        }))
        .unwrap();

        assert_eq!(route.from_usd(), Some(250.10));
        assert_eq!(route.to_usd(), Some(249.5));
        assert_eq!(route.gas_cost_usd, None);
        assert_eq!(route.gas_usd(), None);
    }

    #[test]
    fn test_fallback_fields() {
        let route: Route = serde_json::from_value(json!({
            "fees": {"totalFeesInUsd": "1.25"},
            "estimate": {"fromAmountUSD": "100", "toAmountUSD": "98.7", "executionDuration": 180}
        }))
        .unwrap();

        assert_eq!(route.gas_usd(), Some(1.25));
        assert_eq!(route.from_usd(), Some(100.0));
        assert_eq!(route.to_usd(), Some(98.7));
        assert_eq!(route.execution_duration(), 180.0);
        assert_eq!(route.step_count(), 0);
    }

    #[test]
    fn test_primary_fields_win_over_fallbacks() {
        let route: Route = serde_json::from_value(json!({
            "gasCostUSD": "0.5",
            "fees": {"totalFeesInUsd": "9"},
        }))
        .unwrap();
        assert_eq!(route.gas_usd(), Some(0.5));
    }

    #[test]
    fn test_unknown_duration_is_zero() {
        let route: Route = serde_json::from_value(json!({"steps": [{"tool": "hop"}]})).unwrap();
        assert_eq!(route.execution_duration(), 0.0);
        assert_eq!(Route::default().execution_duration(), 0.0);
    }

    #[test]
    fn test_duration_summed_from_steps() {
        let route: Route = serde_json::from_value(json!({
            "steps": [
                {"tool": "stargate", "estimate": {"executionDuration": 60}},
                {"tool": "uniswap", "estimate": {"executionDuration": 30.5}},
                {"tool": "hop"}
            ]
        }))
        .unwrap();
        assert_eq!(route.execution_duration(), 90.5);
        assert_eq!(route.tools(), vec!["stargate", "uniswap", "hop"]);
    }

    #[test]
    fn test_step_keeps_unknown_fields() {
        let raw = json!({
            "id": "step-1",
            "type": "lifi",
            "tool": "stargate",
            "action": {
                "fromChainId": 1,
                "toChainId": 137,
                "fromToken": {"symbol": "ETH"},
                "slippage": 0.005
            },
            "estimate": {"executionDuration": 120, "approvalAddress": "0xabc"},
            "includedSteps": [{"id": "inner"}]
        });

        let step: Step = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(step.from_chain_id(), Some(1));
        assert_eq!(step.approval_address(), Some("0xabc"));
        assert_eq!(step.from_token_address(), None);
        assert!(step.transaction_request.is_none());
        assert_eq!(serde_json::to_value(&step).unwrap(), raw);
    }
}
