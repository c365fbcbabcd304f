//! LI.FI API paths and related constants

/// Multi-route search (POST)
pub const ROUTES_PATH: &str = "advanced/routes";

/// Single best quote (GET)
pub const QUOTE_PATH: &str = "quote";

/// Populate a route step with its transaction request (POST)
pub const STEP_TRANSACTION_PATH: &str = "advanced/stepTransaction";

/// Header carrying the optional API key
pub const API_KEY_HEADER: &str = "x-lifi-api-key";

/// Swap page of the Jumper frontend
pub const JUMPER_SWAP_URL: &str = "https://jumper.exchange/swap";

/// Token symbol Jumper uses for the native asset
pub const JUMPER_NATIVE_SYMBOL: &str = "ETH";

pub const USER_AGENT: &str = "crosschain-dashboard";
