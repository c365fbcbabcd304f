//! dashboard-core: Shared types, errors, amount conversion and configuration
//!
//! This crate provides the foundational types used across the dashboard workspace.

pub mod amount;
pub mod config;
pub mod errors;
pub mod format;
pub mod types;

pub use amount::{from_smallest_unit, to_smallest_unit};
pub use config::*;
pub use errors::*;
pub use format::{format_amount, format_usd};
pub use types::*;
