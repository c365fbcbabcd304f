//! bridge-session: The bridge page workflow
//!
//! Holds the form, the fetched routes and the status lines of one user
//! session, and drives fetch/execute actions through the quote client,
//! wallet bridge and route executor.

pub mod executor;
pub mod form;
pub mod selection;
pub mod session;

pub use executor::RouteExecutor;
pub use form::BridgeForm;
pub use selection::RouteSelection;
pub use session::{execute_route, fetch_routes, run_route, status, BridgeSession};
