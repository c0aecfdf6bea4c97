//! Submission adapter: the JSON-RPC node that hands out recent blockhashes
//! and accepts signed transactions.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("{0}")]
    Transport(String),

    /// The node's JSON-RPC `error` object. The message is kept verbatim.
    #[error("{message}")]
    Node { code: i64, message: String },

    #[error("unexpected RPC response: {0}")]
    InvalidResponse(String),
}

/// Everything the gateway needs from a cluster. No retries happen behind
/// this trait; a failed call surfaces once.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Latest blockhash, used as the transaction recency token.
    async fn latest_blockhash(&self) -> Result<[u8; 32], RpcError>;

    /// Submit signed wire bytes; returns the transaction signature.
    async fn send_transaction(&self, wire: &[u8]) -> Result<String, RpcError>;

    /// Native balance of `address`, in lamports.
    async fn get_balance(&self, address: &str) -> Result<u64, RpcError>;
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

/// `ChainClient` backed by a Solana JSON-RPC endpoint over HTTP.
pub struct SolanaRpcClient {
    http: reqwest::Client,
    url: String,
}

impl SolanaRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, RpcError> {
        tracing::debug!(method, "rpc call");

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(format!("{method}: HTTP {status}: {e}")))?;

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| error.to_string());
            tracing::warn!(method, code, %message, "rpc error");
            return Err(RpcError::Node { code, message });
        }

        let result = body
            .get("result")
            .cloned()
            .ok_or_else(|| RpcError::InvalidResponse(format!("{method}: missing result")))?;

        serde_json::from_value(result)
            .map_err(|e| RpcError::InvalidResponse(format!("{method}: {e}")))
    }
}

#[async_trait]
impl ChainClient for SolanaRpcClient {
    async fn latest_blockhash(&self) -> Result<[u8; 32], RpcError> {
        let response: WithContext<BlockhashValue> = self
            .call("getLatestBlockhash", json!([{ "commitment": "finalized" }]))
            .await?;

        let raw = bs58::decode(&response.value.blockhash)
            .into_vec()
            .map_err(|e| RpcError::InvalidResponse(format!("blockhash: {e}")))?;

        raw.try_into().map_err(|raw: Vec<u8>| {
            RpcError::InvalidResponse(format!("blockhash is {} bytes, expected 32", raw.len()))
        })
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, RpcError> {
        let encoded = BASE64.encode(wire);
        self.call(
            "sendTransaction",
            json!([encoded, { "encoding": "base64", "preflightCommitment": "confirmed" }]),
        )
        .await
    }

    async fn get_balance(&self, address: &str) -> Result<u64, RpcError> {
        let response: WithContext<u64> = self.call("getBalance", json!([address])).await?;
        Ok(response.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    /// Serve a canned JSON-RPC node on an ephemeral port. The handler
    /// answers by method name.
    async fn spawn_node(handler: fn(&str, &Value) -> Value) -> String {
        let app = Router::new().route(
            "/",
            post(move |Json(req): Json<Value>| async move {
                let method = req["method"].as_str().unwrap_or_default().to_string();
                Json(handler(&method, &req["params"]))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(url: String) -> SolanaRpcClient {
        SolanaRpcClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn latest_blockhash_is_decoded() {
        let url = spawn_node(|method, _| {
            assert_eq!(method, "getLatestBlockhash");
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 1 },
                    "value": {
                        "blockhash": bs58::encode([7u8; 32]).into_string(),
                        "lastValidBlockHeight": 100
                    }
                }
            })
        })
        .await;

        assert_eq!(client(url).latest_blockhash().await.unwrap(), [7u8; 32]);
    }

    #[tokio::test]
    async fn send_transaction_posts_base64_and_returns_signature() {
        let url = spawn_node(|method, params| {
            assert_eq!(method, "sendTransaction");
            assert_eq!(params[0], "AQID");
            assert_eq!(params[1]["encoding"], "base64");
            json!({ "jsonrpc": "2.0", "id": 1, "result": "5igS1g" })
        })
        .await;

        let id = client(url).send_transaction(&[1, 2, 3]).await.unwrap();
        assert_eq!(id, "5igS1g");
    }

    #[tokio::test]
    async fn get_balance_reads_context_value() {
        let url = spawn_node(|method, params| {
            assert_eq!(method, "getBalance");
            assert_eq!(params[0], "11111111111111111111111111111111");
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 9 }, "value": 2_500_000_000u64 }
            })
        })
        .await;

        let balance = client(url)
            .get_balance("11111111111111111111111111111111")
            .await
            .unwrap();
        assert_eq!(balance, 2_500_000_000);
    }

    #[tokio::test]
    async fn node_error_message_is_kept_verbatim() {
        let url = spawn_node(|_, _| {
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {
                    "code": -32002,
                    "message": "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit."
                }
            })
        })
        .await;

        let err = client(url).send_transaction(&[0]).await.unwrap_err();
        match &err {
            RpcError::Node { code, .. } => assert_eq!(*code, -32002),
            other => panic!("expected node error, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit."
        );
    }

    #[tokio::test]
    async fn short_blockhash_is_rejected() {
        let url = spawn_node(|_, _| {
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 1 }, "value": { "blockhash": "abc" } }
            })
        })
        .await;

        let err = client(url).latest_blockhash().await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_node_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}"))
            .get_balance("11111111111111111111111111111111")
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
    }
}
