use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chain_sol::derive_associated_address;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::state::AppState;
use crate::workflow::{self, TokenTransferReceipt, TransferRequest};

#[derive(Deserialize)]
pub struct AtaLookup {
    address: Option<String>,
    #[serde(alias = "assetId")]
    mint: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtaResponse {
    status: bool,
    ata_address: String,
}

#[derive(Serialize)]
pub struct TransferResponse {
    status: bool,
    #[serde(flatten)]
    receipt: TokenTransferReceipt,
}

pub async fn get_ata_address(
    body: Result<Json<AtaLookup>, JsonRejection>,
) -> Result<Json<AtaResponse>, GatewayError> {
    let Json(body) = body?;
    let owner = body
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or(GatewayError::MissingField("address"))?;
    let mint = body
        .mint
        .filter(|m| !m.trim().is_empty())
        .ok_or(GatewayError::MissingField("mint"))?;

    let (ata_address, _bump) = derive_associated_address(&owner, &mint)?;
    Ok(Json(AtaResponse {
        status: true,
        ata_address,
    }))
}

pub async fn transfer_tokens(
    State(state): State<AppState>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, GatewayError> {
    run_transfer(state, body, false).await
}

pub async fn create_ata_and_transfer_tokens(
    State(state): State<AppState>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, GatewayError> {
    run_transfer(state, body, true).await
}

async fn run_transfer(
    state: AppState,
    body: Result<Json<TransferRequest>, JsonRejection>,
    create_recipient_account: bool,
) -> Result<Json<TransferResponse>, GatewayError> {
    let Json(request) = body?;
    let receipt =
        workflow::transfer_tokens(state.chain.as_ref(), request, create_recipient_account).await?;
    Ok(Json(TransferResponse {
        status: true,
        receipt,
    }))
}
