//! SPL Token instructions and associated token account (ATA) derivation,
//! without the `spl-token` or `solana-sdk` crates.

use sha2::{Digest, Sha256};

use crate::address::{address_to_bytes, bytes_to_address};
use crate::error::SolError;
use crate::transaction::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: [u8; 32] = [
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
];

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: [u8; 32] = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
];

/// Suffix hashed into every program-derived address.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// SPL Token `TransferChecked` instruction index.
const TRANSFER_CHECKED_IX: u8 = 12;

/// Associated Token Account program `Create` instruction index.
const CREATE_ATA_IX: u8 = 0;

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Build an SPL Token `TransferChecked` instruction.
///
/// Moves `amount` base units of `mint` from `source` to `destination`
/// (both token accounts), authorized by `owner`. `decimals` must equal the
/// mint's decimals or the token program rejects the transfer, which is what
/// catches a caller scaling the amount with the wrong number of places.
///
/// Data: `[12] || amount (u64 LE) || decimals (u8)`, 10 bytes.
pub fn build_transfer_checked(
    source: &[u8; 32],
    mint: &[u8; 32],
    destination: &[u8; 32],
    owner: &[u8; 32],
    amount: u64,
    decimals: u8,
) -> Result<SolInstruction, SolError> {
    if amount == 0 {
        return Err(SolError::InvalidInstructionInput(
            "SPL transfer amount must be > 0".into(),
        ));
    }

    let mut data = Vec::with_capacity(10);
    data.push(TRANSFER_CHECKED_IX);
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);

    Ok(SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*source, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::writable(*destination, false),
            SolAccountMeta::readonly(*owner, true),
        ],
        data,
    })
}

/// Build an Associated Token Account program `Create` instruction.
///
/// `payer` funds the rent-exempt balance of `associated_account`, which must
/// be the ATA of (`wallet`, `mint`). The program fails the instruction if the
/// account already exists.
pub fn build_create_associated_token_account(
    payer: &[u8; 32],
    associated_account: &[u8; 32],
    wallet: &[u8; 32],
    mint: &[u8; 32],
) -> SolInstruction {
    SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::writable(*associated_account, false),
            SolAccountMeta::readonly(*wallet, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: vec![CREATE_ATA_IX],
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account for a wallet + mint pair, returning
/// the address and its bump seed.
///
/// Seeds are `[wallet, token_program_id, mint]` under the Associated Token
/// Account program.
pub fn derive_associated_token_address(
    wallet: &[u8; 32],
    mint: &[u8; 32],
) -> Result<([u8; 32], u8), SolError> {
    find_program_address(
        &[wallet.as_ref(), &TOKEN_PROGRAM_ID, mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
}

/// String form of [`derive_associated_token_address`]: Base58 owner and
/// mint in, Base58 ATA and bump out.
pub fn derive_associated_address(owner: &str, asset_id: &str) -> Result<(String, u8), SolError> {
    let owner = address_to_bytes(owner)?;
    let mint = address_to_bytes(asset_id)?;
    let (ata, bump) = derive_associated_token_address(&owner, &mint)?;
    Ok((bytes_to_address(&ata), bump))
}

/// Iterate bump seeds 255 → 0 and return the first
/// `SHA-256(seeds.. || bump || program_id || "ProgramDerivedAddress")`
/// that is NOT a valid Ed25519 point.
fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), SolError> {
    (0u8..=255)
        .rev()
        .find_map(|bump| try_create_program_address(seeds, bump, program_id).map(|a| (a, bump)))
        .ok_or_else(|| {
            SolError::DerivationExhausted("every bump seed produced an on-curve point".into())
        })
}

fn try_create_program_address(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &[u8; 32],
) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();
    (!is_on_curve(&hash)).then_some(hash)
}

/// True if the bytes decompress to a point on the Ed25519 curve.
fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
