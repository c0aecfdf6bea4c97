//! Solana chain support for the wallet gateway.
//!
//! Associated token account derivation, amount scaling, SPL token transfer
//! assembly, and the legacy transaction wire format, all without pulling in
//! `solana-sdk`. Signing uses `ed25519-dalek`; addresses use `bs58`.

pub mod address;
pub mod amount;
pub mod error;
pub mod keypair;
pub mod spl_token;
pub mod transaction;
pub mod transfer;

pub use address::{address_to_bytes, bytes_to_address, validate_address};
pub use amount::{normalize, parse_scale, LAMPORTS_SCALE};
pub use error::SolError;
pub use keypair::SolKeypair;
pub use spl_token::{
    build_create_associated_token_account, build_transfer_checked, derive_associated_address,
    derive_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use transaction::{
    build_sol_transfer, build_system_transfer_instruction, compile_transaction,
    decode_compact_u16, decode_transaction, encode_compact_u16, serialize_message,
    sign_transaction, CompiledInstruction, SignedTransaction, SolAccountMeta, SolInstruction,
    SolTransaction, SYSTEM_PROGRAM_ID,
};
pub use transfer::{assemble_transfer, TransferAccounts, TransferInstructionSet};
