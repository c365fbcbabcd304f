//! Data Transfer Objects for API requests and responses

use bridge_session::{BridgeForm, BridgeSession};
use dashboard_core::{format_usd, ChainId, Error, TokenAddress, TokenDecimals};
use evm_wallet::{WalletPhase, WalletSession};
use lifi::{ExecutionReceipt, Quote, Route};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Base URL of the route service
    pub quote_api: String,
    pub wallet_configured: bool,
}

impl HealthResponse {
    pub fn new(quote_api: String, wallet_configured: bool) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            quote_api,
            wallet_configured,
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&Error> for ApiError {
    fn from(e: &Error) -> Self {
        Self::new(e.error_code(), e.to_string())
    }
}

/// One row of the route table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub index: usize,
    pub id: Option<String>,
    pub steps: usize,
    pub tools: Vec<String>,
    /// Display strings, `-` when unknown
    pub gas_usd: String,
    pub from_usd: String,
    pub to_usd: String,
    /// Seconds, `0` when unknown
    pub duration: f64,
    pub selected: bool,
}

impl RouteSummary {
    pub fn new(index: usize, route: &Route, selected: bool) -> Self {
        Self {
            index,
            id: route.id.clone(),
            steps: route.step_count(),
            tools: route.tools().into_iter().map(str::to_string).collect(),
            gas_usd: format_usd(route.gas_usd()),
            from_usd: format_usd(route.from_usd()),
            to_usd: format_usd(route.to_usd()),
            duration: route.execution_duration(),
            selected,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    /// Whether a wallet provider is configured at all
    pub available: bool,
    pub phase: WalletPhase,
    pub address: Option<String>,
    pub chain_id: Option<ChainId>,
}

impl WalletView {
    pub fn new(available: bool, phase: WalletPhase, session: Option<WalletSession>) -> Self {
        let (address, chain_id) = match session {
            Some(s) => (Some(s.address), s.chain_id),
            None => (None, None),
        };
        Self {
            available,
            phase,
            address,
            chain_id,
        }
    }
}

/// Everything the bridge page renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub form: BridgeForm,
    pub routes: Vec<RouteSummary>,
    pub busy: bool,
    pub status: String,
    pub error: Option<String>,
    pub jumper_url: String,
    pub last_receipt: Option<ExecutionReceipt>,
    pub wallet: WalletView,
}

impl SessionResponse {
    pub fn new(session: &BridgeSession, wallet: WalletView) -> Self {
        let selection = session.selection();
        let routes = selection
            .routes()
            .iter()
            .enumerate()
            .map(|(i, r)| RouteSummary::new(i, r, selection.selected_index() == Some(i)))
            .collect();

        Self {
            form: session.form().clone(),
            routes,
            busy: session.is_busy(),
            status: session.status().to_string(),
            error: session.error().map(str::to_string),
            jumper_url: session.form().jumper_url(),
            last_receipt: session.last_receipt().cloned(),
            wallet,
        }
    }
}

/// Partial form update; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormUpdateRequest {
    pub from_chain: Option<ChainId>,
    pub to_chain: Option<ChainId>,
    pub from_token: Option<TokenAddress>,
    pub to_token: Option<TokenAddress>,
    pub amount: Option<String>,
    pub from_token_decimals: Option<TokenDecimals>,
}

impl FormUpdateRequest {
    pub fn apply(self, form: &BridgeForm) -> BridgeForm {
        BridgeForm {
            from_chain: self.from_chain.unwrap_or(form.from_chain),
            to_chain: self.to_chain.unwrap_or(form.to_chain),
            from_token: self.from_token.unwrap_or_else(|| form.from_token.clone()),
            to_token: self.to_token.unwrap_or_else(|| form.to_token.clone()),
            amount: self.amount.unwrap_or_else(|| form.amount.clone()),
            from_token_decimals: self.from_token_decimals.unwrap_or(form.from_token_decimals),
        }
    }
}

/// Route index request (select / execute)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    pub index: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub receipt: ExecutionReceipt,
    pub session: SessionResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub tool: Option<String>,
    /// Destination token smallest units
    pub to_amount: Option<String>,
    pub to_amount_min: Option<String>,
    pub to_usd: String,
    pub fees_usd: String,
    pub duration: Option<f64>,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        let fees_usd = format_usd(quote.total_fees_usd());
        Self {
            tool: quote.tool,
            to_amount: quote.estimate.to_amount,
            to_amount_min: quote.estimate.to_amount_min,
            to_usd: format_usd(quote.estimate.to_amount_usd),
            fees_usd,
            duration: quote.estimate.execution_duration,
        }
    }
}
