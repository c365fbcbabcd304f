//! Cross-chain dashboard application library

use anyhow::Context;
use dashboard_api::AppState;
use dashboard_core::AppConfig;

fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["dashboard=debug", "info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load configuration and serve the dashboard API until shutdown
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting cross-chain dashboard");

    let config = AppConfig::from_env().context("loading configuration")?;
    let addr = config.api_addr();
    let state = AppState::from_config(config).context("initializing application state")?;

    dashboard_api::start_server(state)
        .await
        .with_context(|| format!("serving API on {}", addr))?;

    Ok(())
}
