//! Bridge session state and the fetch/execute workflow
//!
//! Every action is split into a synchronous `begin_*` step, the network call,
//! and a synchronous `finish_*` step, so a caller that keeps the session
//! behind a lock never holds it across an await. The busy flag is the only
//! guard against overlapping actions.
//!
//! Results are applied in the order they resolve. A slow fetch finishing
//! after a newer one overwrites the newer routes.
//!
//! An action that is dropped between its `begin_*` and `finish_*` steps must
//! be closed with [`BridgeSession::abandon`], or the session stays busy.

use dashboard_core::{ChainId, Error, QuoteError};
use evm_wallet::WalletBridge;
use lifi::{ExecutionReceipt, QuoteClient, QuoteRequest, Route};
use uuid::Uuid;

use crate::executor::RouteExecutor;
use crate::form::BridgeForm;
use crate::selection::RouteSelection;

/// Status line texts
pub mod status {
    pub const READY: &str = "Ready";
    pub const FETCHING: &str = "Fetching routes from LI.FI ...";
    pub const FETCH_FAILED: &str = "Failed to get routes";
    pub const EXECUTING: &str = "Executing route...";
    pub const EXECUTED: &str = "Route executed! Check your wallet or explorer.";
    pub const EXECUTION_FAILED: &str = "Execution failed.";

    pub fn found(count: usize) -> String {
        format!("Found {} routes.", count)
    }
}

/// State of one dashboard session
#[derive(Debug, Clone)]
pub struct BridgeSession {
    form: BridgeForm,
    selection: RouteSelection,
    busy: bool,
    status: String,
    error: Option<String>,
    last_receipt: Option<ExecutionReceipt>,
}

impl Default for BridgeSession {
    fn default() -> Self {
        Self {
            form: BridgeForm::default(),
            selection: RouteSelection::new(),
            busy: false,
            status: status::READY.to_string(),
            error: None,
            last_receipt: None,
        }
    }
}

impl BridgeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &BridgeForm {
        &self.form
    }

    pub fn selection(&self) -> &RouteSelection {
        &self.selection
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_receipt(&self) -> Option<&ExecutionReceipt> {
        self.last_receipt.as_ref()
    }

    /// Replace the form; fetched routes are kept until the next fetch
    pub fn set_form(&mut self, form: BridgeForm) -> Result<(), Error> {
        if self.busy {
            return Err(Error::Busy);
        }
        self.form = form;
        Ok(())
    }

    pub fn select(&mut self, index: usize) -> Result<&Route, Error> {
        if self.busy {
            return Err(Error::Busy);
        }
        Ok(self.selection.select(index)?)
    }

    fn record_failure(&mut self, status: &str, error: &Error) {
        self.status = status.to_string();
        self.error = Some(error.to_string());
    }

    /// Validate the form and mark a fetch as in flight
    pub fn begin_fetch(&mut self) -> Result<QuoteRequest, Error> {
        if self.busy {
            return Err(Error::Busy);
        }

        let request = match self.form.validate() {
            Ok(request) => request,
            Err(e) => {
                self.record_failure(status::FETCH_FAILED, &e);
                return Err(e);
            }
        };

        self.busy = true;
        self.error = None;
        self.status = status::FETCHING.to_string();
        Ok(request)
    }

    /// Apply a fetch result. On failure the previous routes stay listed.
    pub fn finish_fetch(&mut self, result: Result<Vec<Route>, QuoteError>) -> Result<usize, Error> {
        self.busy = false;
        match result {
            Ok(routes) => {
                let count = routes.len();
                self.selection.set_routes(routes);
                self.status = status::found(count);
                Ok(count)
            }
            Err(e) => {
                let e = Error::from(e);
                self.record_failure(status::FETCH_FAILED, &e);
                Err(e)
            }
        }
    }

    /// Select a route and mark an execution as in flight
    pub fn begin_execute(&mut self, index: usize) -> Result<Route, Error> {
        if self.busy {
            return Err(Error::Busy);
        }

        let selected = self.selection.select(index).map(Route::clone);
        let route = match selected {
            Ok(route) => route,
            Err(e) => {
                let e = Error::from(e);
                self.record_failure(status::EXECUTION_FAILED, &e);
                return Err(e);
            }
        };

        self.busy = true;
        self.error = None;
        self.status = status::EXECUTING.to_string();
        Ok(route)
    }

    pub fn finish_execute(
        &mut self,
        result: Result<ExecutionReceipt, Error>,
    ) -> Result<ExecutionReceipt, Error> {
        self.busy = false;
        match result {
            Ok(receipt) => {
                self.status = status::EXECUTED.to_string();
                self.last_receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                self.record_failure(status::EXECUTION_FAILED, &e);
                Err(e)
            }
        }
    }

    /// Close an in-flight action that will never reach its `finish_*` step.
    ///
    /// No-op when nothing is in flight.
    pub fn abandon(&mut self, failed_status: &str) {
        if !self.busy {
            return;
        }
        self.busy = false;
        self.record_failure(failed_status, &Error::Cancelled);
    }

    /// Chain the wallet must be on to run `route`
    pub fn required_chain(&self, route: &Route) -> ChainId {
        route.from_chain_id.unwrap_or(self.form.from_chain)
    }
}

/// Abandons the session's in-flight action when dropped before `finish_*`
struct InFlight<'a> {
    session: &'a mut BridgeSession,
    failed_status: &'static str,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.session.is_busy() {
            tracing::warn!("In-flight action dropped, releasing session");
        }
        self.session.abandon(self.failed_status);
    }
}

/// Fetch routes for the current form
pub async fn fetch_routes(session: &mut BridgeSession, client: &dyn QuoteClient) -> Result<usize, Error> {
    let request = session.begin_fetch()?;
    let in_flight = InFlight {
        session,
        failed_status: status::FETCH_FAILED,
    };
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, from_amount = %request.from_amount, "Fetching routes");

    let result = client.get_routes(&request).await;
    let outcome = in_flight.session.finish_fetch(result);

    match &outcome {
        Ok(count) => tracing::info!(%request_id, count, "Routes fetched"),
        Err(e) => tracing::warn!(%request_id, "Route fetch failed: {}", e),
    }
    outcome
}

/// Connect the wallet on the route's source chain and run it
pub async fn run_route(
    route: &Route,
    required_chain: ChainId,
    wallet: &WalletBridge,
    executor: &RouteExecutor,
) -> Result<ExecutionReceipt, Error> {
    let handle = wallet.ensure(required_chain).await?;
    Ok(executor.run(route, &handle).await?)
}

/// Execute the route at `index` of the current list
pub async fn execute_route(
    session: &mut BridgeSession,
    index: usize,
    wallet: &WalletBridge,
    executor: &RouteExecutor,
) -> Result<ExecutionReceipt, Error> {
    let route = session.begin_execute(index)?;
    let required_chain = session.required_chain(&route);
    let in_flight = InFlight {
        session,
        failed_status: status::EXECUTION_FAILED,
    };
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, index, required_chain, "Executing route");

    let result = run_route(&route, required_chain, wallet, executor).await;
    let outcome = in_flight.session.finish_execute(result);

    match &outcome {
        Ok(receipt) => tracing::info!(%request_id, txs = receipt.tx_hashes.len(), "Route executed"),
        Err(e) => tracing::warn!(%request_id, "Route execution failed: {}", e),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashboard_core::{ExecutionError, WalletError};
    use evm_wallet::{ProviderError, TransactionRequest, WalletHandle, WalletProvider};
    use lifi::{EngineError, ExecutionEngine};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Quote client whose answer never arrives
    struct SilentQuoteClient;

    #[async_trait]
    impl QuoteClient for SilentQuoteClient {
        async fn get_routes(&self, _request: &QuoteRequest) -> Result<Vec<Route>, QuoteError> {
            std::future::pending().await
        }
    }

    /// Quote client that records the request and answers with a fixed result
    struct RecordingQuoteClient {
        seen: Mutex<Vec<QuoteRequest>>,
        result: Result<Vec<Route>, QuoteError>,
    }

    impl RecordingQuoteClient {
        fn answering(result: Result<Vec<Route>, QuoteError>) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                result,
            }
        }
    }

    #[async_trait]
    impl QuoteClient for RecordingQuoteClient {
        async fn get_routes(&self, request: &QuoteRequest) -> Result<Vec<Route>, QuoteError> {
            self.seen.lock().unwrap().push(request.clone());
            self.result.clone()
        }
    }

    struct FixedWallet {
        chain: ChainId,
    }

    #[async_trait]
    impl WalletProvider for FixedWallet {
        async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
            Ok(vec!["0xabc".to_string()])
        }
        async fn chain_id(&self) -> Result<ChainId, ProviderError> {
            Ok(self.chain)
        }
        async fn switch_chain(&self, _chain_id: ChainId) -> Result<(), ProviderError> {
            Err(ProviderError::UserRejected("no".into()))
        }
        async fn send_transaction(&self, _tx: &TransactionRequest) -> Result<String, ProviderError> {
            Ok("0x1".to_string())
        }
    }

    struct OkEngine;

    #[async_trait]
    impl ExecutionEngine for OkEngine {
        async fn execute(
            &self,
            route: &Route,
            _wallet: &WalletHandle,
        ) -> Result<ExecutionReceipt, EngineError> {
            Ok(ExecutionReceipt {
                route_id: route.id.clone(),
                tx_hashes: vec!["0xfeed".to_string()],
            })
        }
    }

    fn route(id: &str) -> Route {
        Route {
            id: Some(id.to_string()),
            ..Route::default()
        }
    }

    fn executor() -> RouteExecutor {
        RouteExecutor::new(Arc::new(OkEngine))
    }

    #[tokio::test]
    async fn test_form_amount_reaches_quote_client() {
        let client = RecordingQuoteClient::answering(Ok(vec![route("a"), route("b")]));
        let mut session = BridgeSession::new();
        session
            .set_form(BridgeForm {
                amount: "1.5".to_string(),
                from_token_decimals: 6,
                ..BridgeForm::default()
            })
            .unwrap();

        let count = fetch_routes(&mut session, &client).await.unwrap();
        assert_eq!(count, 2);

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].from_amount.as_str(), "1500000");
        assert_eq!(seen[0].from_chain_id, 1);
        assert_eq!(seen[0].to_chain_id, 137);

        assert_eq!(session.status(), "Found 2 routes.");
        assert!(!session.is_busy());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_routes() {
        let mut session = BridgeSession::new();
        fetch_routes(&mut session, &RecordingQuoteClient::answering(Ok(vec![route("a")])))
            .await
            .unwrap();

        let failing = RecordingQuoteClient::answering(Err(QuoteError::Upstream("No available quotes".into())));
        let err = fetch_routes(&mut session, &failing).await.unwrap_err();

        assert_eq!(err.error_code(), "quote_upstream");
        assert_eq!(session.status(), status::FETCH_FAILED);
        assert_eq!(session.error(), Some("Quote service error: No available quotes"));
        assert_eq!(session.selection().routes().len(), 1);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_invalid_amount_never_reaches_client() {
        let client = RecordingQuoteClient::answering(Ok(Vec::new()));
        let mut session = BridgeSession::new();
        session
            .set_form(BridgeForm {
                amount: "abc".to_string(),
                ..BridgeForm::default()
            })
            .unwrap();

        let err = fetch_routes(&mut session, &client).await.unwrap_err();
        assert!(matches!(err, Error::Amount(_)));
        assert!(client.seen.lock().unwrap().is_empty());
        assert_eq!(session.status(), status::FETCH_FAILED);
        assert!(session.error().is_some());
    }

    #[test]
    fn test_busy_session_refuses_actions() {
        let mut session = BridgeSession::new();
        session.begin_fetch().unwrap();
        assert!(session.is_busy());

        assert!(matches!(session.begin_fetch(), Err(Error::Busy)));
        assert!(matches!(session.begin_execute(0), Err(Error::Busy)));
        assert!(matches!(session.set_form(BridgeForm::default()), Err(Error::Busy)));
        assert_eq!(session.status(), status::FETCHING);

        session.finish_fetch(Ok(Vec::new())).unwrap();
        assert!(!session.is_busy());
        assert_eq!(session.status(), "Found 0 routes.");
    }

    #[tokio::test]
    async fn test_dropped_fetch_releases_session() {
        let mut session = BridgeSession::new();
        session.finish_fetch(Ok(vec![route("kept")])).unwrap();

        let timed_out = tokio::time::timeout(
            Duration::from_millis(50),
            fetch_routes(&mut session, &SilentQuoteClient),
        )
        .await;
        assert!(timed_out.is_err());

        assert!(!session.is_busy());
        assert_eq!(session.status(), status::FETCH_FAILED);
        assert_eq!(session.error(), Some("Request was interrupted before it finished"));
        assert_eq!(session.selection().routes().len(), 1);

        let client = RecordingQuoteClient::answering(Ok(vec![route("a"), route("b")]));
        assert_eq!(fetch_routes(&mut session, &client).await.unwrap(), 2);
    }

    #[test]
    fn test_abandon_is_noop_when_idle() {
        let mut session = BridgeSession::new();
        session.abandon(status::FETCH_FAILED);
        assert_eq!(session.status(), status::READY);
        assert!(session.error().is_none());

        session.begin_fetch().unwrap();
        session.abandon(status::FETCH_FAILED);
        assert!(!session.is_busy());
        assert_eq!(session.status(), status::FETCH_FAILED);
    }

    #[test]
    fn test_results_apply_in_resolution_order() {
        let mut session = BridgeSession::new();
        session.begin_fetch().unwrap();
        session.finish_fetch(Ok(vec![route("newer")])).unwrap();
        // A late result from an earlier request still lands
        session.finish_fetch(Ok(vec![route("stale"), route("stale-2")])).unwrap();
        assert_eq!(session.selection().routes()[0].id.as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_execute_out_of_range_index() {
        let mut session = BridgeSession::new();
        let wallet = WalletBridge::new(None);
        let err = execute_route(&mut session, 0, &wallet, &executor()).await.unwrap_err();
        assert_eq!(err.error_code(), "index_out_of_range");
        assert_eq!(session.status(), status::EXECUTION_FAILED);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_execute_without_wallet() {
        let mut session = BridgeSession::new();
        session.finish_fetch(Ok(vec![route("a")])).unwrap();
        let wallet = WalletBridge::new(None);

        let err = execute_route(&mut session, 0, &wallet, &executor()).await.unwrap_err();
        assert!(matches!(err, Error::Wallet(WalletError::NotFound)));
        assert_eq!(session.error(), Some("No wallet found (MetaMask/Rabby)"));
        assert_eq!(session.status(), status::EXECUTION_FAILED);
        assert!(wallet.session().await.is_none());
    }

    #[tokio::test]
    async fn test_execute_with_failed_switch() {
        let mut session = BridgeSession::new();
        session.finish_fetch(Ok(vec![route("a")])).unwrap();
        let wallet = WalletBridge::new(Some(Arc::new(FixedWallet { chain: 10 }) as Arc<dyn WalletProvider>));

        let err = execute_route(&mut session, 0, &wallet, &executor()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Wallet(WalletError::ChainSwitchFailed { chain_id: 1 })
        ));
        assert_eq!(session.error(), Some("Please switch to chain 1 manually."));
    }

    #[tokio::test]
    async fn test_execute_success_records_receipt() {
        let mut session = BridgeSession::new();
        session.finish_fetch(Ok(vec![route("a"), route("b")])).unwrap();
        let wallet = WalletBridge::new(Some(Arc::new(FixedWallet { chain: 1 }) as Arc<dyn WalletProvider>));

        let receipt = execute_route(&mut session, 1, &wallet, &executor()).await.unwrap();
        assert_eq!(receipt.route_id.as_deref(), Some("b"));
        assert_eq!(session.status(), status::EXECUTED);
        assert_eq!(session.last_receipt(), Some(&receipt));
        assert_eq!(session.selection().selected_index(), Some(1));
    }

    #[test]
    fn test_required_chain_prefers_route() {
        let session = BridgeSession::new();
        let mut r = route("a");
        assert_eq!(session.required_chain(&r), 1);
        r.from_chain_id = Some(42161);
        assert_eq!(session.required_chain(&r), 42161);
    }

    #[test]
    fn test_execution_error_message_is_recorded() {
        let mut session = BridgeSession::new();
        session.finish_fetch(Ok(vec![route("a")])).unwrap();
        session.begin_execute(0).unwrap();
        let err = session
            .finish_execute(Err(ExecutionError::Failed("reverted".into()).into()))
            .unwrap_err();
        assert_eq!(err.error_code(), "execution_failed");
        assert_eq!(session.error(), Some("Execution failed: reverted"));
        assert!(session.last_receipt().is_none());
    }
}
