//! Listener setup for the dashboard API
//!
//! The frontend is served from another origin, so every response carries
//! permissive CORS headers for the methods the bridge endpoints use.

use axum::http::Method;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::create_router;
use crate::AppState;

/// Router with tracing and CORS applied
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::POST])
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve on an already bound listener until the process exits
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    tracing::info!(addr = %listener.local_addr()?, "Dashboard API listening");
    axum::serve(listener, create_app(state)).await
}

/// Bind the configured `api_host:api_port` and serve
pub async fn start_server(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config().api_addr();
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state).await
}
