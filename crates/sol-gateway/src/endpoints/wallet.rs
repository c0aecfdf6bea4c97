use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chain_sol::{validate_address, SolKeypair};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::state::AppState;
use crate::workflow::{self, NativeTransferRequest};

#[derive(Serialize)]
pub struct MessageResponse {
    status: bool,
    message: String,
}

#[derive(Serialize)]
pub struct KeyPairResponse {
    status: bool,
    address: String,
    pk: String,
}

impl KeyPairResponse {
    fn from_keypair(keypair: &SolKeypair) -> Self {
        Self {
            status: true,
            address: keypair.address(),
            pk: crypto_utils::encode_secret(&keypair.to_keypair_bytes()[..]).to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct SecretBody {
    pk: Option<String>,
}

#[derive(Deserialize)]
pub struct AddressBody {
    address: Option<String>,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    status: bool,
    balance: u64,
}

pub async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse {
        status: true,
        message: "hello solana".into(),
    })
}

pub async fn create_key_pair() -> Json<KeyPairResponse> {
    let keypair = SolKeypair::generate();
    tracing::info!(address = %keypair.address(), "generated keypair");
    Json(KeyPairResponse::from_keypair(&keypair))
}

/// Recover the address for a base64 secret and echo the canonical 64-byte
/// form back.
pub async fn secret_to_address(
    body: Result<Json<SecretBody>, JsonRejection>,
) -> Result<Json<KeyPairResponse>, GatewayError> {
    let Json(body) = body?;
    let pk = body
        .pk
        .filter(|pk| !pk.trim().is_empty())
        .map(crypto_utils::ZeroizingString::new)
        .ok_or(GatewayError::MissingField("pk"))?;

    let keypair = SolKeypair::from_base64(&pk)?;
    Ok(Json(KeyPairResponse::from_keypair(&keypair)))
}

pub async fn get_balance(
    State(state): State<AppState>,
    body: Result<Json<AddressBody>, JsonRejection>,
) -> Result<Json<BalanceResponse>, GatewayError> {
    let Json(body) = body?;
    let address = body
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or(GatewayError::MissingField("address"))?;
    validate_address(&address)?;

    let balance = state.chain.get_balance(&address).await?;
    Ok(Json(BalanceResponse {
        status: true,
        balance,
    }))
}

pub async fn create_and_send_transaction(
    State(state): State<AppState>,
    body: Result<Json<NativeTransferRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, GatewayError> {
    let Json(request) = body?;
    let transaction_id = workflow::transfer_native(state.chain.as_ref(), request).await?;
    Ok(Json(MessageResponse {
        status: true,
        message: transaction_id,
    }))
}
