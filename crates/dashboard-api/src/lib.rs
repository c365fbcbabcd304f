//! dashboard-api: HTTP API layer for the cross-chain dashboard
//!
//! Exposes the bridge session workflow as a small REST API for the frontend.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::AppState;
