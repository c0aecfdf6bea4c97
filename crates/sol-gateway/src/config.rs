//! Startup configuration, read once from the environment.

use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:12345";
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// JSON-RPC endpoint of the target cluster (`SOLANA_RPC_URL`).
    pub rpc_url: String,
    /// Listen address (`BIND_ADDR`).
    pub bind_addr: SocketAddr,
    /// Deadline applied to every outbound RPC call (`RPC_TIMEOUT_SECS`).
    pub rpc_timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rpc_url = lookup("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "SOLANA_RPC_URL",
                reason: format!("{rpc_url} is not an http(s) URL"),
            });
        }

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let timeout_secs = match lookup("RPC_TIMEOUT_SECS") {
            None => DEFAULT_RPC_TIMEOUT_SECS,
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "RPC_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "RPC_TIMEOUT_SECS",
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            rpc_url,
            bind_addr,
            rpc_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
