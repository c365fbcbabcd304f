//! EIP-1193 wallet provider over JSON-RPC 2.0 / HTTP
//!
//! Desktop wallets such as Frame expose the EIP-1193 request surface on a
//! local HTTP endpoint; this provider talks to such an endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashboard_core::ChainId;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::provider::{ProviderError, TransactionRequest, WalletProvider};

/// Wallet calls wait on user approval, so the timeout is generous (5 minutes)
const WALLET_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Wallet provider backed by a JSON-RPC endpoint
#[derive(Debug)]
pub struct JsonRpcWalletProvider {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcWalletProvider {
    pub fn new(url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("crosschain-dashboard")
            .timeout(WALLET_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "Wallet RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let parsed: RpcResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ProviderError::Transport(format!("HTTP {}", status)));
            }
            Err(e) => return Err(ProviderError::InvalidResponse(e.to_string())),
        };

        if let Some(err) = parsed.error {
            tracing::debug!(method, code = err.code, "Wallet RPC error: {}", err.message);
            return Err(ProviderError::from_rpc(err.code, err.message));
        }

        serde_json::from_value(parsed.result.unwrap_or(Value::Null))
            .map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

/// Parse a chain ID given as `0x`-hex string, decimal string or number
fn parse_chain_id(value: &Value) -> Option<ChainId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex) => ChainId::from_str_radix(hex, 16).ok(),
            None => s.parse().ok(),
        },
        _ => None,
    }
}

/// Transaction object in RPC form (quantities as hex, `gas` instead of `gasLimit`)
fn transaction_object(tx: &TransactionRequest) -> Value {
    let mut obj = Map::new();
    if let Some(from) = &tx.from {
        obj.insert("from".into(), json!(from));
    }
    obj.insert("to".into(), json!(tx.to));
    if let Some(data) = &tx.data {
        obj.insert("data".into(), json!(data));
    }
    if let Some(value) = &tx.value {
        obj.insert("value".into(), json!(value));
    }
    if let Some(gas) = &tx.gas_limit {
        obj.insert("gas".into(), json!(gas));
    }
    if let Some(gas_price) = &tx.gas_price {
        obj.insert("gasPrice".into(), json!(gas_price));
    }
    if let Some(chain_id) = tx.chain_id {
        obj.insert("chainId".into(), json!(format!("{:#x}", chain_id)));
    }
    Value::Object(obj)
}

fn send_transaction_params(tx: &TransactionRequest) -> Value {
    json!([transaction_object(tx)])
}

fn call_params(tx: &TransactionRequest) -> Value {
    json!([transaction_object(tx), "latest"])
}

#[async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.request("eth_requestAccounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        let raw: Value = self.request("eth_chainId", json!([])).await?;
        parse_chain_id(&raw)
            .ok_or_else(|| ProviderError::InvalidResponse(format!("eth_chainId: {}", raw)))
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ProviderError> {
        let _: Value = self
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": format!("{:#x}", chain_id) }]),
            )
            .await?;
        Ok(())
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, ProviderError> {
        self.request("eth_sendTransaction", send_transaction_params(tx))
            .await
    }

    async fn call_contract(&self, tx: &TransactionRequest) -> Result<String, ProviderError> {
        self.request("eth_call", call_params(tx)).await
    }
}
