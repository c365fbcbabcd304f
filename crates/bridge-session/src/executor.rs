//! Route execution entry point

use std::sync::Arc;

use dashboard_core::ExecutionError;
use evm_wallet::WalletHandle;
use lifi::{ExecutionEngine, ExecutionReceipt, Route};

/// Runs a route through an execution engine.
///
/// No status polling, confirmation waiting or rollback happens here; a
/// failure part way through leaves earlier transactions in place.
#[derive(Clone)]
pub struct RouteExecutor {
    engine: Arc<dyn ExecutionEngine>,
}

impl RouteExecutor {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        Self { engine }
    }

    pub async fn run(
        &self,
        route: &Route,
        wallet: &WalletHandle,
    ) -> Result<ExecutionReceipt, ExecutionError> {
        self.engine.execute(route, wallet).await.map_err(|e| {
            tracing::warn!("Route execution failed: {}", e);
            ExecutionError::Failed(e.to_string())
        })
    }
}
