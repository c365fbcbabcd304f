//! LI.FI Cross-Chain Route Aggregator
//!
//! Fetches bridge/swap routes from the LI.FI REST API and executes them step
//! by step through a connected EVM wallet. Each step's transaction is
//! populated by `/advanced/stepTransaction` right before it is signed, so
//! quotes never go stale between steps. Steps that spend an ERC-20 token get
//! an `approve` first when the wallet's allowance is short.

pub mod allowance;
pub mod client;
pub mod constants;
pub mod engine;
pub mod jumper;
pub mod quote;
pub mod route;

pub use allowance::{AbiError, Approval};
pub use client::{LifiClient, QuoteClient, QuoteRequest};
pub use engine::{EngineError, ExecutionEngine, ExecutionReceipt, LifiExecutionEngine};
pub use jumper::jumper_swap_url;
pub use quote::{FeeCost, Quote, QuoteEstimate};
pub use route::{Route, RouteEstimate, RouteFees, Step, StepAction, StepEstimate, StepToken};
