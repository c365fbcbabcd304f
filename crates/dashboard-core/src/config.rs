//! Configuration types for the dashboard

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";
/// Environment override for the wallet JSON-RPC endpoint
pub const WALLET_RPC_ENV: &str = "DASHBOARD_WALLET_RPC";
/// Environment override for the API port
pub const API_PORT_ENV: &str = "DASHBOARD_API_PORT";
/// Environment override for the API listen address
pub const API_HOST_ENV: &str = "DASHBOARD_API_HOST";

/// LI.FI quote/route service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifiConfig {
    /// API base URL (e.g., "https://li.quest/v1")
    #[serde(default = "default_lifi_url")]
    pub api_url: String,

    /// Integrator name reported with every request
    #[serde(default = "default_integrator")]
    pub integrator: String,

    /// API key for higher rate limits (optional)
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum slippage as a fraction (0.005 = 0.5%)
    #[serde(default)]
    pub slippage: Option<f64>,
}

fn default_lifi_url() -> String {
    "https://li.quest/v1".to_string()
}

fn default_integrator() -> String {
    "CrossChain-DeFi-Dashboard".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LifiConfig {
    fn default() -> Self {
        Self {
            api_url: default_lifi_url(),
            integrator: default_integrator(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            slippage: None,
        }
    }
}

/// Wallet provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    /// EIP-1193 JSON-RPC endpoint of the wallet (e.g., "http://127.0.0.1:1248").
    /// When unset no wallet provider is available.
    #[serde(default)]
    pub rpc_url: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Quote/route service settings
    #[serde(default)]
    pub lifi: LifiConfig,

    /// Wallet provider settings
    #[serde(default)]
    pub wallet: WalletConfig,

    /// API listen address; loopback unless the frontend runs elsewhere
    #[serde(default = "default_api_host")]
    pub api_host: IpAddr,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_api_port() -> u16 {
    19090
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lifi: LifiConfig::default(),
            wallet: WalletConfig::default(),
            api_host: default_api_host(),
            api_port: default_api_port(),
        }
    }
}

impl AppConfig {
    /// Socket address the API server binds
    pub fn api_addr(&self) -> SocketAddr {
        SocketAddr::new(self.api_host, self.api_port)
    }

    /// Load config from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load config from `DASHBOARD_CONFIG` (defaults when unset), then apply
    /// environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(url) = std::env::var(WALLET_RPC_ENV) {
            config.wallet.rpc_url = Some(url).filter(|u| !u.is_empty());
        }
        if let Ok(port) = std::env::var(API_PORT_ENV) {
            config.api_port = port
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a valid port: {}", API_PORT_ENV, port)))?;
        }
        if let Ok(host) = std::env::var(API_HOST_ENV) {
            config.api_host = host
                .parse()
                .map_err(|_| Error::Config(format!("{} is not an IP address: {}", API_HOST_ENV, host)))?;
        }

        tracing::debug!(
            lifi_url = %config.lifi.api_url,
            wallet_configured = config.wallet.rpc_url.is_some(),
            api_addr = %config.api_addr(),
            "Loaded configuration"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.lifi.api_url, "https://li.quest/v1");
        assert_eq!(config.lifi.integrator, "CrossChain-DeFi-Dashboard");
        assert_eq!(config.lifi.timeout_secs, 30);
        assert!(config.wallet.rpc_url.is_none());
        assert_eq!(config.api_addr().to_string(), "127.0.0.1:19090");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"lifi": {"slippage": 0.005}, "wallet": {"rpc_url": "http://127.0.0.1:1248"}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.lifi.api_url, "https://li.quest/v1");
        assert_eq!(config.lifi.slippage, Some(0.005));
        assert_eq!(config.wallet.rpc_url.as_deref(), Some("http://127.0.0.1:1248"));
        assert_eq!(config.api_port, 19090);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("dashboard-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"api_host": "0.0.0.0", "api_port": 8088}"#).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.api_addr().to_string(), "0.0.0.0:8088");

        let missing = AppConfig::from_file(Path::new("/nonexistent/dashboard.json"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
