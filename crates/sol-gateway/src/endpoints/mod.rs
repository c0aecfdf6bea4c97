//! HTTP handlers. Each one returns the `{"status": true, ...}` envelope on
//! success and a [`GatewayError`](crate::error::GatewayError) otherwise.

mod tokens;
mod wallet;

pub use tokens::{create_ata_and_transfer_tokens, get_ata_address, transfer_tokens};
pub use wallet::{create_and_send_transaction, create_key_pair, get_balance, hello, secret_to_address};
