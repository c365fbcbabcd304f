//! LI.FI REST client
//!
//! Response handling is the same for every endpoint:
//! - transport failure (unreachable, timeout) -> `QuoteError::Network`
//! - an `error` field in the body, or a non-2xx status carrying a `message`
//!   -> `QuoteError::Upstream`
//! - a non-2xx status whose body is not JSON -> `QuoteError::Network("HTTP <status>")`

use std::time::Duration;

use async_trait::async_trait;
use dashboard_core::{ChainId, LifiConfig, QuoteError, SmallestUnitAmount, TokenAddress};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{
    API_KEY_HEADER, QUOTE_PATH, ROUTES_PATH, STEP_TRANSACTION_PATH, USER_AGENT,
};
use crate::quote::Quote;
use crate::route::{Route, Step};

/// Parameters of a route search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub from_chain_id: ChainId,
    pub to_chain_id: ChainId,
    pub from_token_address: TokenAddress,
    pub to_token_address: TokenAddress,
    pub from_amount: SmallestUnitAmount,
}

/// Source of candidate routes
#[async_trait]
pub trait QuoteClient: Send + Sync {
    /// Fetch candidate routes; an empty list is a valid answer
    async fn get_routes(&self, request: &QuoteRequest) -> Result<Vec<Route>, QuoteError>;

    /// Single best quote for the request
    async fn get_quote(
        &self,
        _request: &QuoteRequest,
        _from_address: Option<&str>,
    ) -> Result<Quote, QuoteError> {
        Err(QuoteError::Upstream("single quotes are not supported".to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteOptions<'a> {
    integrator: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    slippage: Option<f64>,
}

#[derive(Debug, Serialize)]
struct RoutesBody<'a> {
    #[serde(flatten)]
    request: &'a QuoteRequest,
    options: RouteOptions<'a>,
}

/// HTTP client for the LI.FI API
#[derive(Debug, Clone)]
pub struct LifiClient {
    client: reqwest::Client,
    config: LifiConfig,
}

impl LifiClient {
    pub fn new(config: LifiConfig) -> Result<Self, QuoteError> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let value = HeaderValue::from_str(&config.api_key)
                .map_err(|e| QuoteError::Network(format!("invalid API key header: {}", e)))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LifiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), QuoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;
        Ok((status, body))
    }

    /// Fetch the transaction request for one route step
    pub async fn step_transaction(&self, step: &Step) -> Result<Step, QuoteError> {
        let (status, body) = self
            .send(self.client.post(self.url(STEP_TRANSACTION_PATH)).json(step))
            .await?;
        let value = check_response(status, &body)?
            .ok_or_else(|| QuoteError::Upstream("malformed step response".to_string()))?;

        serde_json::from_value(value)
            .map_err(|_| QuoteError::Upstream("malformed step response".to_string()))
    }
}

#[async_trait]
impl QuoteClient for LifiClient {
    async fn get_routes(&self, request: &QuoteRequest) -> Result<Vec<Route>, QuoteError> {
        let body = RoutesBody {
            request,
            options: RouteOptions {
                integrator: &self.config.integrator,
                slippage: self.config.slippage,
            },
        };

        tracing::debug!(
            from_chain = request.from_chain_id,
            to_chain = request.to_chain_id,
            from_amount = %request.from_amount,
            "Requesting LI.FI routes"
        );

        let (status, text) = self
            .send(self.client.post(self.url(ROUTES_PATH)).json(&body))
            .await?;

        let routes = parse_routes(check_response(status, &text)?);
        tracing::info!("LI.FI returned {} routes", routes.len());
        Ok(routes)
    }

    async fn get_quote(
        &self,
        request: &QuoteRequest,
        from_address: Option<&str>,
    ) -> Result<Quote, QuoteError> {
        let from_chain = request.from_chain_id.to_string();
        let to_chain = request.to_chain_id.to_string();
        let mut query: Vec<(&str, String)> = vec![
            ("fromChain", from_chain),
            ("toChain", to_chain),
            ("fromToken", request.from_token_address.to_string()),
            ("toToken", request.to_token_address.to_string()),
            ("fromAmount", request.from_amount.to_string()),
            ("integrator", self.config.integrator.clone()),
        ];
        if let Some(address) = from_address {
            query.push(("fromAddress", address.to_string()));
        }
        if let Some(slippage) = self.config.slippage {
            query.push(("slippage", slippage.to_string()));
        }

        let (status, body) = self
            .send(self.client.get(self.url(QUOTE_PATH)).query(&query))
            .await?;
        let value = check_response(status, &body)?
            .ok_or_else(|| QuoteError::Upstream("malformed quote response".to_string()))?;

        serde_json::from_value(value)
            .map_err(|_| QuoteError::Upstream("malformed quote response".to_string()))
    }
}

/// Message carried by a top-level `error` field, if any
fn upstream_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => Some(
            obj.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// Classify a response; returns the parsed body of a successful one, or
/// `None` when a successful body is not JSON.
fn check_response(status: u16, body: &str) -> Result<Option<Value>, QuoteError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if let Some(message) = parsed.as_ref().and_then(upstream_error) {
        tracing::warn!(status, "LI.FI error: {}", message);
        return Err(QuoteError::Upstream(message));
    }

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str);
        tracing::warn!(status, "LI.FI request failed");
        return Err(match message {
            Some(m) => QuoteError::Upstream(m.to_string()),
            None => QuoteError::Network(format!("HTTP {}", status)),
        });
    }

    Ok(parsed)
}

/// Pull routes out of a successful body, skipping entries that do not decode
fn parse_routes(body: Option<Value>) -> Vec<Route> {
    let Some(Value::Array(entries)) = body.and_then(|mut v| v.get_mut("routes").map(Value::take))
    else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Route>(entry) {
            Ok(route) => Some(route),
            Err(e) => {
                tracing::debug!("Skipping undecodable route: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn sample_request() -> QuoteRequest {
        QuoteRequest {
            from_chain_id: 1,
            to_chain_id: 137,
            from_token_address: TokenAddress::native(),
            to_token_address: TokenAddress::new(dashboard_core::constants::USDC_POLYGON),
            from_amount: dashboard_core::to_smallest_unit("0.1", 18).unwrap(),
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{}/v1", addr)
    }

    fn client_for(api_url: String) -> LifiClient {
        LifiClient::new(LifiConfig {
            api_url,
            api_key: "test-key".to_string(),
            slippage: Some(0.005),
            ..LifiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_check_response_error_shapes() {
        assert_eq!(
            check_response(200, r#"{"error": "No routes"}"#),
            Err(QuoteError::Upstream("No routes".into()))
        );
        assert_eq!(
            check_response(200, r#"{"error": {"message": "Invalid token", "code": 1011}}"#),
            Err(QuoteError::Upstream("Invalid token".into()))
        );
        assert_eq!(
            check_response(404, r#"{"message": "Not found", "code": 1003}"#),
            Err(QuoteError::Upstream("Not found".into()))
        );
        assert_eq!(
            check_response(502, "<html>Bad Gateway</html>"),
            Err(QuoteError::Network("HTTP 502".into()))
        );
        assert_eq!(check_response(200, "not json"), Ok(None));
        assert_eq!(
            check_response(200, r#"{"routes": [], "error": null}"#),
            Ok(Some(json!({"routes": [], "error": null})))
        );
    }

    #[test]
    fn test_parse_routes_is_lenient() {
        assert!(parse_routes(None).is_empty());
        assert!(parse_routes(Some(json!({"unfilteredRoutes": []}))).is_empty());
        assert!(parse_routes(Some(json!({"routes": "nope"}))).is_empty());

        let routes = parse_routes(Some(json!({
            "routes": [
                {"id": "a", "steps": []},
                {"id": "b", "steps": "broken"},
                {"id": "c"}
            ]
        })));
        let ids: Vec<_> = routes.iter().map(|r| r.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_routes_body_shape() {
        let request = sample_request();
        let body = RoutesBody {
            request: &request,
            options: RouteOptions {
                integrator: "CrossChain-DeFi-Dashboard",
                slippage: None,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["fromChainId"], 1);
        assert_eq!(value["toChainId"], 137);
        assert_eq!(value["fromTokenAddress"], "0x0000000000000000000000000000000000000000");
        assert_eq!(value["fromAmount"], "100000000000000000");
        assert_eq!(value["options"]["integrator"], "CrossChain-DeFi-Dashboard");
        assert!(value["options"].get("slippage").is_none());
    }

    #[tokio::test]
    async fn test_get_routes_against_stub() {
        let seen = Arc::new(Mutex::new(None::<(Option<String>, Value)>));
        let recorded = seen.clone();
        let app = Router::new().route(
            "/v1/advanced/routes",
            post(move |headers: axum::http::HeaderMap, Json(body): Json<Value>| {
                let recorded = recorded.clone();
                async move {
                    let key = headers
                        .get("x-lifi-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *recorded.lock().unwrap() = Some((key, body));
                    Json(json!({
                        "routes": [
                            {"id": "r1", "gasCostUSD": "2.10", "toAmountUSD": "249.00", "steps": [{"tool": "stargate"}]},
                            {"id": "r2", "fees": {"totalFeesInUsd": "3"}, "steps": []}
                        ]
                    }))
                }
            }),
        );
        let client = client_for(serve(app).await);

        let routes = client.get_routes(&sample_request()).await.unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].gas_usd(), Some(2.10));
        assert_eq!(routes[1].gas_usd(), Some(3.0));

        let (key, body) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(key.as_deref(), Some("test-key"));
        assert_eq!(body["fromAmount"], "100000000000000000");
        assert_eq!(body["options"]["slippage"], 0.005);
    }

    #[tokio::test]
    async fn test_get_routes_upstream_error() {
        let app = Router::new().route(
            "/v1/advanced/routes",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "Invalid fromAmount", "code": 1011})),
                )
            }),
        );
        let client = client_for(serve(app).await);
        let err = client.get_routes(&sample_request()).await.unwrap_err();
        assert_eq!(err, QuoteError::Upstream("Invalid fromAmount".into()));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let client = client_for("http://127.0.0.1:1/v1".to_string());
        let err = client.get_routes(&sample_request()).await.unwrap_err();
        assert!(matches!(err, QuoteError::Network(_)));
    }

    #[tokio::test]
    async fn test_get_quote_sends_query() {
        let seen = Arc::new(Mutex::new(None::<String>));
        let recorded = seen.clone();
        let app = Router::new().route(
            "/v1/quote",
            get(move |uri: axum::http::Uri| {
                let recorded = recorded.clone();
                async move {
                    *recorded.lock().unwrap() = uri.query().map(str::to_string);
                    Json(json!({"tool": "hop", "estimate": {"toAmount": "249000000"}}))
                }
            }),
        );
        let client = client_for(serve(app).await);

        let quote = client
            .get_quote(&sample_request(), Some("0x00000000000000000000000000000000000000aa"))
            .await
            .unwrap();
        assert_eq!(quote.estimate.to_amount.as_deref(), Some("249000000"));

        let query = seen.lock().unwrap().clone().unwrap();
        assert!(query.contains("fromChain=1"));
        assert!(query.contains("toChain=137"));
        assert!(query.contains("fromAmount=100000000000000000"));
        assert!(query.contains("integrator=CrossChain-DeFi-Dashboard"));
        assert!(query.contains("fromAddress=0x00000000000000000000000000000000000000aa"));
    }

    #[tokio::test]
    async fn test_get_quote_rejects_malformed_body() {
        let app = Router::new().route("/v1/quote", get(|| async { Json(json!({"estimate": 5})) }));
        let client = client_for(serve(app).await);
        let err = client.get_quote(&sample_request(), None).await.unwrap_err();
        assert_eq!(err, QuoteError::Upstream("malformed quote response".into()));
    }
}
