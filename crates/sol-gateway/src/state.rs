use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::rpc::{ChainClient, RpcError, SolanaRpcClient};

/// Shared by every handler. The chain client is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<dyn ChainClient>,
}

impl AppState {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, RpcError> {
        let client = SolanaRpcClient::new(config.rpc_url.clone(), config.rpc_timeout)?;
        Ok(Self::new(Arc::new(client)))
    }
}
