//! HTTP gateway for Solana wallet operations: keypairs, balances, native
//! transfers, and SPL token transfers between associated token accounts.

pub mod config;
pub mod endpoints;
pub mod error;
pub mod rpc;
pub mod state;
pub mod workflow;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use rpc::{ChainClient, RpcError, SolanaRpcClient};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/hello", get(endpoints::hello))
        .route(
            "/createKeyPair",
            get(endpoints::create_key_pair).post(endpoints::create_key_pair),
        )
        .route("/pKToAddress", post(endpoints::secret_to_address))
        .route("/getBalance", post(endpoints::get_balance))
        .route(
            "/createAndSendTransaction",
            post(endpoints::create_and_send_transaction),
        )
        .route("/getAtaAddress", post(endpoints::get_ata_address))
        .route("/transferTokens", post(endpoints::transfer_tokens))
        .route(
            "/createAtaAndTransferTokens",
            post(endpoints::create_ata_and_transfer_tokens),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
