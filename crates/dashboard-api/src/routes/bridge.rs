//! Bridge page endpoints
//!
//! Fetch and execute follow the session's begin/finish protocol: the session
//! lock is taken for `begin_*`, released for the network call, and taken
//! again for `finish_*`. A second action while one is in flight gets 409.
//! The network call and `finish_*` run in a spawned task, so a dropped request
//! never leaves the session busy.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use bridge_session::{run_route, status};
use dashboard_core::{ChainInfo, Error, SUPPORTED_CHAINS};
use tokio::task::JoinHandle;

use crate::dto::{
    ApiError, ExecuteResponse, FormUpdateRequest, IndexRequest, QuoteResponse, SessionResponse,
};
use crate::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn error_response(e: &Error) -> (StatusCode, Json<ApiError>) {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::from(e)))
}

/// Create bridge routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chains", get(get_chains))
        .route("/session", get(get_session))
        .route("/form", put(update_form))
        .route("/routes", post(fetch_routes))
        .route("/select", post(select_route))
        .route("/execute", post(execute_route))
        .route("/quote", post(get_quote))
        .route("/connect", post(connect_wallet))
}

/// Await a detached workflow tail. If the task died without reaching its
/// `finish_*` step the session is released here instead.
async fn join_or_abandon<T>(
    state: &AppState,
    task: JoinHandle<Result<T, Error>>,
    failed_status: &str,
) -> Result<T, Error> {
    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Workflow task failed: {}", e);
            state.session().write().await.abandon(failed_status);
            Err(Error::Cancelled)
        }
    }
}

async fn session_response(state: &AppState) -> SessionResponse {
    let wallet = state.wallet_view().await;
    let session = state.session().read().await;
    SessionResponse::new(&session, wallet)
}

/// GET /bridge/chains - Chains offered in the form
pub async fn get_chains() -> Json<Vec<ChainInfo>> {
    Json(SUPPORTED_CHAINS.to_vec())
}

/// GET /bridge/session - Form, routes, status lines and wallet state
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(session_response(&state).await)
}

/// PUT /bridge/form - Update form fields
pub async fn update_form(
    State(state): State<AppState>,
    Json(update): Json<FormUpdateRequest>,
) -> ApiResult<SessionResponse> {
    {
        let mut session = state.session().write().await;
        let form = update.apply(session.form());
        session.set_form(form).map_err(|e| error_response(&e))?;
    }
    Ok(Json(session_response(&state).await))
}

/// POST /bridge/routes - Fetch routes for the current form
pub async fn fetch_routes(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let request = state
        .session()
        .write()
        .await
        .begin_fetch()
        .map_err(|e| error_response(&e))?;

    tracing::info!(
        from_chain = request.from_chain_id,
        to_chain = request.to_chain_id,
        "Fetching routes"
    );

    // Detached from the request so `finish_fetch` runs even if the client goes away
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let result = task_state.quotes().get_routes(&request).await;
        let outcome = task_state.session().write().await.finish_fetch(result);
        match &outcome {
            Ok(count) => tracing::info!("Found {} routes", count),
            Err(e) => tracing::warn!("Route fetch failed: {}", e),
        }
        outcome
    });

    match join_or_abandon(&state, task, status::FETCH_FAILED).await {
        Ok(_) => Ok(Json(session_response(&state).await)),
        Err(e) => Err(error_response(&e)),
    }
}

/// POST /bridge/select - Select a route by index
pub async fn select_route(
    State(state): State<AppState>,
    Json(request): Json<IndexRequest>,
) -> ApiResult<SessionResponse> {
    {
        let mut session = state.session().write().await;
        session.select(request.index).map_err(|e| error_response(&e))?;
    }
    Ok(Json(session_response(&state).await))
}

/// POST /bridge/execute - Connect the wallet and execute a route
pub async fn execute_route(
    State(state): State<AppState>,
    Json(request): Json<IndexRequest>,
) -> ApiResult<ExecuteResponse> {
    let (route, required_chain) = {
        let mut session = state.session().write().await;
        let route = session
            .begin_execute(request.index)
            .map_err(|e| error_response(&e))?;
        let chain = session.required_chain(&route);
        (route, chain)
    };

    tracing::info!(index = request.index, required_chain, "Executing route");

    // Transactions may already be broadcast, so the receipt is recorded regardless of the client
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let result = run_route(
            &route,
            required_chain,
            task_state.wallet(),
            task_state.executor(),
        )
        .await;
        let outcome = task_state.session().write().await.finish_execute(result);
        match &outcome {
            Ok(receipt) => tracing::info!(txs = receipt.tx_hashes.len(), "Route executed"),
            Err(e) => tracing::warn!("Route execution failed: {}", e),
        }
        outcome
    });

    let receipt = join_or_abandon(&state, task, status::EXECUTION_FAILED)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(ExecuteResponse {
        receipt,
        session: session_response(&state).await,
    }))
}

/// POST /bridge/connect - Connect the wallet on the form's source chain
pub async fn connect_wallet(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let chain_id = state.session().read().await.form().from_chain;
    state
        .wallet()
        .ensure(chain_id)
        .await
        .map_err(|e| error_response(&Error::from(e)))?;
    Ok(Json(session_response(&state).await))
}

/// POST /bridge/quote - Single best quote for the current form.
///
/// Does not touch the route list or the busy flag.
pub async fn get_quote(State(state): State<AppState>) -> ApiResult<QuoteResponse> {
    let request = state
        .session()
        .read()
        .await
        .form()
        .validate()
        .map_err(|e| error_response(&e))?;
    let from_address = state.wallet().session().await.map(|s| s.address);

    let quote = state
        .quotes()
        .get_quote(&request, from_address.as_deref())
        .await
        .map_err(|e| error_response(&Error::from(e)))?;

    Ok(Json(QuoteResponse::from(quote)))
}
