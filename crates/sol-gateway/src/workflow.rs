//! Request validation and the transfer workflows behind the HTTP handlers.
//!
//! Every check that can fail without the network runs before the first RPC
//! call: field presence, amount and scale, secret decoding, address
//! derivation, instruction assembly. Only then is a blockhash fetched and
//! the transaction signed and submitted.

use chain_sol::{
    address_to_bytes, assemble_transfer, build_sol_transfer, compile_transaction, normalize,
    parse_scale, sign_transaction, SolError, SolKeypair, SolTransaction, TransferAccounts,
    LAMPORTS_SCALE,
};
use crypto_utils::ZeroizingString;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::rpc::ChainClient;

/// Body of `/transferTokens` and `/createAtaAndTransferTokens`.
///
/// No `Debug`: the sender secret must not end up in logs.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(alias = "senderPK")]
    pub sender_secret: Option<String>,
    pub recipient_address: Option<String>,
    pub amount: Option<f64>,
    pub scale: Option<f64>,
    #[serde(alias = "mint")]
    pub asset_id: Option<String>,
}

/// Body of `/createAndSendTransaction`. Amount is in SOL.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransferRequest {
    #[serde(alias = "senderPK")]
    pub sender_secret: Option<String>,
    pub recipient_address: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferReceipt {
    pub sender_derived_address: String,
    pub recipient_derived_address: String,
    pub transaction_id: String,
}

#[derive(Debug)]
struct ValidTransfer {
    sender_secret: ZeroizingString,
    recipient: String,
    asset_id: String,
    amount: f64,
    scale: u8,
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, GatewayError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GatewayError::MissingField(field)),
    }
}

/// Zero counts as absent. NaN passes through and is rejected later as an
/// invalid amount or scale.
fn required_number(value: Option<f64>, field: &'static str) -> Result<f64, GatewayError> {
    match value {
        Some(v) if v != 0.0 => Ok(v),
        _ => Err(GatewayError::MissingField(field)),
    }
}

impl TransferRequest {
    fn validate(self) -> Result<ValidTransfer, GatewayError> {
        let sender_secret =
            ZeroizingString::new(required_text(self.sender_secret, "senderSecret")?);
        let recipient = required_text(self.recipient_address, "recipientAddress")?;
        let asset_id = required_text(self.asset_id, "assetId")?;
        let amount = required_number(self.amount, "amount")?;
        let scale = parse_scale(required_number(self.scale, "scale")?)?;

        Ok(ValidTransfer {
            sender_secret,
            recipient,
            asset_id,
            amount,
            scale,
        })
    }
}

/// Normalize, and refuse amounts that round down to nothing.
fn base_units(amount: f64, scale: u8) -> Result<u64, GatewayError> {
    let units = normalize(amount, scale)?;
    if units == 0 {
        return Err(SolError::InvalidAmount(format!(
            "{amount} is below one base unit at scale {scale}"
        ))
        .into());
    }
    Ok(units)
}

/// Sign with the fee payer's key and submit. Returns the id reported by the
/// node.
async fn submit(
    chain: &dyn ChainClient,
    tx: &SolTransaction,
    signer: &SolKeypair,
) -> Result<String, GatewayError> {
    let signed = sign_transaction(tx, signer)?;
    let local_id = signed.id();
    let remote_id = chain.send_transaction(&signed.wire).await?;

    if remote_id != local_id {
        tracing::warn!(%local_id, %remote_id, "node reported a different transaction id");
    }
    Ok(remote_id)
}

/// SPL token transfer from the sender's associated token account to the
/// recipient's. With `create_recipient_account` the recipient's account is
/// created in the same transaction, paid for by the sender.
pub async fn transfer_tokens(
    chain: &dyn ChainClient,
    request: TransferRequest,
    create_recipient_account: bool,
) -> Result<TokenTransferReceipt, GatewayError> {
    let valid = request.validate()?;
    let amount = base_units(valid.amount, valid.scale)?;
    let sender = SolKeypair::from_base64(&valid.sender_secret)?;
    let accounts = TransferAccounts::resolve(sender.public_key(), &valid.recipient, &valid.asset_id)?;
    let sender_ata = accounts.sender_ata_address();
    let recipient_ata = accounts.recipient_ata_address();

    tracing::info!(
        sender = %sender.address(),
        %sender_ata,
        %recipient_ata,
        mint = %valid.asset_id,
        amount,
        scale = valid.scale,
        create_recipient_account,
        "token transfer"
    );

    let instructions = assemble_transfer(&accounts, amount, valid.scale, create_recipient_account)?;
    let blockhash = chain.latest_blockhash().await?;
    let tx = compile_transaction(instructions.instructions(), &accounts.sender, &blockhash)?;
    let transaction_id = submit(chain, &tx, &sender).await?;

    tracing::info!(%transaction_id, "token transfer submitted");

    Ok(TokenTransferReceipt {
        sender_derived_address: sender_ata,
        recipient_derived_address: recipient_ata,
        transaction_id,
    })
}

/// Native SOL transfer. `amount` is in SOL and is scaled to lamports.
pub async fn transfer_native(
    chain: &dyn ChainClient,
    request: NativeTransferRequest,
) -> Result<String, GatewayError> {
    let secret = ZeroizingString::new(required_text(request.sender_secret, "senderSecret")?);
    let recipient = required_text(request.recipient_address, "recipientAddress")?;
    let amount = required_number(request.amount, "amount")?;

    let lamports = base_units(amount, LAMPORTS_SCALE)?;
    let sender = SolKeypair::from_base64(&secret)?;
    let to = address_to_bytes(&recipient)?;

    tracing::info!(sender = %sender.address(), %recipient, lamports, "native transfer");

    let blockhash = chain.latest_blockhash().await?;
    let tx = build_sol_transfer(&sender.public_key(), &to, lamports, &blockhash)?;
    let transaction_id = submit(chain, &tx, &sender).await?;

    tracing::info!(%transaction_id, "native transfer submitted");
    Ok(transaction_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> TransferRequest {
        TransferRequest {
            sender_secret: Some("c2VjcmV0".into()),
            recipient_address: Some("11111111111111111111111111111111".into()),
            amount: Some(1.5),
            scale: Some(6.0),
            asset_id: Some("So11111111111111111111111111111111111111112".into()),
        }
    }

    fn missing(err: GatewayError) -> &'static str {
        match err {
            GatewayError::MissingField(field) => field,
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn complete_request_validates() {
        let valid = full_request().validate().unwrap();
        assert_eq!(valid.scale, 6);
        assert_eq!(valid.amount, 1.5);
    }

    #[test]
    fn each_absent_field_is_named() {
        let mut r = full_request();
        r.sender_secret = None;
        assert_eq!(missing(r.validate().unwrap_err()), "senderSecret");

        let mut r = full_request();
        r.recipient_address = Some("   ".into());
        assert_eq!(missing(r.validate().unwrap_err()), "recipientAddress");

        let mut r = full_request();
        r.asset_id = Some(String::new());
        assert_eq!(missing(r.validate().unwrap_err()), "assetId");

        let mut r = full_request();
        r.amount = Some(0.0);
        assert_eq!(missing(r.validate().unwrap_err()), "amount");

        let mut r = full_request();
        r.scale = None;
        assert_eq!(missing(r.validate().unwrap_err()), "scale");
    }

    #[test]
    fn fractional_scale_is_invalid_scale() {
        let mut r = full_request();
        r.scale = Some(2.5);
        let err = r.validate().unwrap_err();
        assert_eq!(err.kind(), "InvalidScale");
    }

    #[test]
    fn wire_aliases_are_accepted() {
        let body = r#"{
            "senderPK": "c2VjcmV0",
            "recipientAddress": "11111111111111111111111111111111",
            "amount": 2,
            "scale": 9,
            "mint": "So11111111111111111111111111111111111111112"
        }"#;
        let r: TransferRequest = serde_json::from_str(body).unwrap();
        assert_eq!(r.sender_secret.as_deref(), Some("c2VjcmV0"));
        assert_eq!(r.asset_id.as_deref(), Some("So11111111111111111111111111111111111111112"));
        assert_eq!(r.amount, Some(2.0));
    }

    #[test]
    fn dust_amount_is_rejected() {
        let err = base_units(0.0000001, 6).unwrap_err();
        assert_eq!(err.kind(), "InvalidAmount");
        assert_eq!(base_units(0.5, 1).unwrap(), 5);
    }
}
