//! Legacy Solana transaction wire format, compiled and signed by hand.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use crate::error::SolError;
use crate::keypair::SolKeypair;

// ---------------------------------------------------------------------------
// Solana System Program
// ---------------------------------------------------------------------------

/// The System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// System Program `Transfer` instruction index (little-endian u32).
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;

/// Account indices are a single byte on the wire.
const MAX_ACCOUNT_KEYS: usize = 256;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value, returning `(value, bytes_consumed)`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            SolError::SerializationError(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        value |= ((byte & 0x7f) as u32) << (7 * consumed);
        consumed += 1;

        if byte & 0x80 == 0 || consumed >= 3 {
            break;
        }
    }

    u16::try_from(value)
        .map(|v| (v, consumed))
        .map_err(|_| SolError::SerializationError("compact-u16 value overflow".into()))
}

fn compact_len(len: usize, what: &str) -> Result<Vec<u8>, SolError> {
    let len = u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("too many {what}: {len}")))?;
    Ok(encode_compact_u16(len))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolAccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

impl SolAccountMeta {
    pub fn writable(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A Solana instruction before it is compiled into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolInstruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled (unsigned) Solana transaction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolTransaction {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<[u8; 32]>,

    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    /// Recent blockhash (the recency token).
    pub recent_blockhash: [u8; 32],

    pub compiled_instructions: Vec<CompiledInstruction>,
}

/// An instruction whose account references are indices into
/// `SolTransaction::account_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// Wire bytes plus the fee payer's signature, which doubles as the
/// transaction id.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub wire: Vec<u8>,
    pub signature: [u8; 64],
}

impl SignedTransaction {
    /// Base58 transaction id, as reported by explorers and `sendTransaction`.
    pub fn id(&self) -> String {
        bs58::encode(self.signature).into_string()
    }
}

// ---------------------------------------------------------------------------
// Transaction building
// ---------------------------------------------------------------------------

/// Build a System Program `Transfer` instruction moving `lamports`.
pub fn build_system_transfer_instruction(
    from: &[u8; 32],
    to: &[u8; 32],
    lamports: u64,
) -> SolInstruction {
    // u32 LE instruction index (2 = Transfer) + u64 LE lamports.
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    SolInstruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*from, true),
            SolAccountMeta::writable(*to, false),
        ],
        data,
    }
}

/// Build a native SOL transfer transaction paid for by `from_pubkey`.
pub fn build_sol_transfer(
    from_pubkey: &[u8; 32],
    to_pubkey: &[u8; 32],
    lamports: u64,
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    if lamports == 0 {
        return Err(SolError::InvalidInstructionInput(
            "lamports must be > 0".into(),
        ));
    }

    let instruction = build_system_transfer_instruction(from_pubkey, to_pubkey, lamports);
    compile_transaction(&[instruction], from_pubkey, recent_blockhash)
}

/// Compile instructions into a message with a single fee payer.
///
/// The fee payer is always a writable signer at index 0.
pub fn compile_transaction(
    instructions: &[SolInstruction],
    fee_payer: &[u8; 32],
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    if instructions.is_empty() {
        return Err(SolError::TransactionBuildError(
            "transaction has no instructions".into(),
        ));
    }

    struct AccountEntry {
        pubkey: [u8; 32],
        is_signer: bool,
        is_writable: bool,
    }

    // Linear scan: instruction account lists are tiny.
    let mut entries: Vec<AccountEntry> = Vec::new();
    let mut upsert = |pubkey: [u8; 32], signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    upsert(*fee_payer, true, true);
    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        upsert(ix.program_id, false, false);
    }

    if entries.len() > MAX_ACCOUNT_KEYS {
        return Err(SolError::TransactionBuildError(format!(
            "{} account keys exceed the {MAX_ACCOUNT_KEYS} limit",
            entries.len()
        )));
    }

    // Stable sort keeps insertion order inside each class, so the fee payer
    // (inserted first, writable signer) stays at index 0.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    let num_required_signatures = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<[u8; 32]> = entries.iter().map(|e| e.pubkey).collect();
    let index_of = |key: &[u8; 32]| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError("account not in account keys".into()))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey))
            .collect::<Result<Vec<u8>, _>>()?;

        compiled.push(CompiledInstruction {
            program_id_index: index_of(&ix.program_id)?,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(SolTransaction {
        account_keys,
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions: compiled,
    })
}

/// Serialize the message (the bytes that get signed).
pub fn serialize_message(tx: &SolTransaction) -> Result<Vec<u8>, SolError> {
    let mut buf = Vec::with_capacity(256);

    buf.push(tx.num_required_signatures);
    buf.push(tx.num_readonly_signed);
    buf.push(tx.num_readonly_unsigned);

    buf.extend_from_slice(&compact_len(tx.account_keys.len(), "account keys")?);
    for key in &tx.account_keys {
        buf.extend_from_slice(key);
    }

    buf.extend_from_slice(&tx.recent_blockhash);

    buf.extend_from_slice(&compact_len(tx.compiled_instructions.len(), "instructions")?);
    for ix in &tx.compiled_instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&compact_len(ix.account_indices.len(), "instruction accounts")?);
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&compact_len(ix.data.len(), "instruction data bytes")?);
        buf.extend_from_slice(&ix.data);
    }

    Ok(buf)
}

/// Sign a single-signer transaction and serialize it to wire format.
///
/// The signer must be the fee payer (account index 0) and the only required
/// signature.
pub fn sign_transaction(
    tx: &SolTransaction,
    signer: &SolKeypair,
) -> Result<SignedTransaction, SolError> {
    if tx.num_required_signatures != 1 {
        return Err(SolError::SigningError(format!(
            "expected exactly one required signature, message has {}",
            tx.num_required_signatures
        )));
    }
    if tx.account_keys.first() != Some(&signer.public_key()) {
        return Err(SolError::SigningError(
            "signer is not the transaction fee payer".into(),
        ));
    }

    let message_bytes = serialize_message(tx)?;
    let signature = signer.sign(&message_bytes).to_bytes();

    let mut wire = Vec::with_capacity(1 + 64 + message_bytes.len());
    wire.extend_from_slice(&encode_compact_u16(1));
    wire.extend_from_slice(&signature);
    wire.extend_from_slice(&message_bytes);

    Ok(SignedTransaction { wire, signature })
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], SolError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| SolError::SerializationError(format!("truncated {what}")))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self, what: &str) -> Result<u8, SolError> {
        Ok(self.take(1, what)?[0])
    }

    fn compact(&mut self) -> Result<usize, SolError> {
        let (value, used) = decode_compact_u16(&self.data[self.pos.min(self.data.len())..])?;
        self.pos += used;
        Ok(value as usize)
    }

    fn key(&mut self, what: &str) -> Result<[u8; 32], SolError> {
        let mut key = [0u8; 32];
        key.copy_from_slice(self.take(32, what)?);
        Ok(key)
    }
}

/// Parse wire bytes back into signatures and the compiled message.
pub fn decode_transaction(wire: &[u8]) -> Result<(Vec<[u8; 64]>, SolTransaction), SolError> {
    let mut r = Reader { data: wire, pos: 0 };

    let num_signatures = r.compact()?;
    let mut signatures = Vec::with_capacity(num_signatures);
    for _ in 0..num_signatures {
        let mut sig = [0u8; 64];
        sig.copy_from_slice(r.take(64, "signature")?);
        signatures.push(sig);
    }

    let num_required_signatures = r.byte("header")?;
    let num_readonly_signed = r.byte("header")?;
    let num_readonly_unsigned = r.byte("header")?;

    let num_accounts = r.compact()?;
    let mut account_keys = Vec::with_capacity(num_accounts);
    for _ in 0..num_accounts {
        account_keys.push(r.key("account key")?);
    }

    let recent_blockhash = r.key("recent blockhash")?;

    let num_instructions = r.compact()?;
    let mut compiled_instructions = Vec::with_capacity(num_instructions);
    for _ in 0..num_instructions {
        let program_id_index = r.byte("program id index")?;
        let n = r.compact()?;
        let account_indices = r.take(n, "account indices")?.to_vec();
        let n = r.compact()?;
        let data = r.take(n, "instruction data")?.to_vec();
        compiled_instructions.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data,
        });
    }

    if r.pos != wire.len() {
        return Err(SolError::SerializationError(format!(
            "{} trailing bytes after message",
            wire.len() - r.pos
        )));
    }

    Ok((
        signatures,
        SolTransaction {
            account_keys,
            num_required_signatures,
            num_readonly_signed,
            num_readonly_unsigned,
            recent_blockhash,
            compiled_instructions,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, VerifyingKey};

    fn payer() -> SolKeypair {
        SolKeypair::from_secret_bytes(&[0x42u8; 32]).unwrap()
    }

    // -- compact-u16 --------------------------------------------------------

    #[test]
    fn compact_u16_boundaries() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
        assert_eq!(encode_compact_u16(128), vec![0x80, 0x01]);
        assert_eq!(encode_compact_u16(16383), vec![0xff, 0x7f]);
        assert_eq!(encode_compact_u16(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_compact_u16(u16::MAX), vec![0xff, 0xff, 0x03]);
    }

    #[test]
    fn decode_compact_u16_reports_consumed_bytes() {
        assert_eq!(decode_compact_u16(&[0x7f, 0xAA]).unwrap(), (127, 1));
        assert_eq!(decode_compact_u16(&[0x80, 0x01]).unwrap(), (128, 2));
        assert_eq!(decode_compact_u16(&[0x80, 0x80, 0x01]).unwrap(), (16384, 3));
    }

    #[test]
    fn decode_compact_u16_errors() {
        assert!(decode_compact_u16(&[]).is_err());
        assert!(decode_compact_u16(&[0x80]).is_err());
        // 0x7f << 14 overflows u16.
        assert!(decode_compact_u16(&[0xff, 0xff, 0x7f]).is_err());
    }

    // -- System transfer ----------------------------------------------------

    #[test]
    fn system_transfer_layout() {
        let ix = build_system_transfer_instruction(&[0xAA; 32], &[0xBB; 32], 1_000_000);
        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
        assert_eq!(ix.accounts[0], SolAccountMeta::writable([0xAA; 32], true));
        assert_eq!(ix.accounts[1], SolAccountMeta::writable([0xBB; 32], false));
    }

    #[test]
    fn zero_lamports_is_rejected() {
        let result = build_sol_transfer(&[1u8; 32], &[2u8; 32], 0, &[0u8; 32]);
        assert!(matches!(result, Err(SolError::InvalidInstructionInput(_))));
    }

    // -- Compilation --------------------------------------------------------

    #[test]
    fn compiled_account_order_and_header() {
        let from = [1u8; 32];
        let to = [2u8; 32];
        let tx = build_sol_transfer(&from, &to, 1000, &[0xAA; 32]).unwrap();

        assert_eq!(tx.account_keys, vec![from, to, SYSTEM_PROGRAM_ID]);
        assert_eq!(tx.num_required_signatures, 1);
        assert_eq!(tx.num_readonly_signed, 0);
        assert_eq!(tx.num_readonly_unsigned, 1);
        assert_eq!(tx.recent_blockhash, [0xAA; 32]);
        assert_eq!(tx.compiled_instructions[0].program_id_index, 2);
        assert_eq!(tx.compiled_instructions[0].account_indices, vec![0, 1]);
    }

    #[test]
    fn self_transfer_deduplicates_accounts() {
        let key = [0xAAu8; 32];
        let tx = build_sol_transfer(&key, &key, 100, &[0u8; 32]).unwrap();
        assert_eq!(tx.account_keys.len(), 2);
    }

    #[test]
    fn fee_payer_stays_first_even_if_listed_late() {
        let payer = [9u8; 32];
        let other_signer = [1u8; 32];
        let ix = SolInstruction {
            program_id: [7u8; 32],
            accounts: vec![
                SolAccountMeta::writable(other_signer, true),
                SolAccountMeta::writable(payer, false),
            ],
            data: vec![],
        };
        let tx = compile_transaction(&[ix], &payer, &[0u8; 32]).unwrap();
        assert_eq!(tx.account_keys[0], payer);
        assert_eq!(tx.num_required_signatures, 2);
    }

    #[test]
    fn empty_instruction_list_is_rejected() {
        assert!(compile_transaction(&[], &[1u8; 32], &[0u8; 32]).is_err());
    }

    // -- Serialization ------------------------------------------------------

    #[test]
    fn message_contains_blockhash_after_keys() {
        let tx = build_sol_transfer(&[1u8; 32], &[2u8; 32], 500, &[0xCC; 32]).unwrap();
        let msg = serialize_message(&tx).unwrap();

        assert_eq!(&msg[..3], &[1, 0, 1]);
        let offset = 3 + 1 + 32 * tx.account_keys.len();
        assert_eq!(&msg[offset..offset + 32], &[0xCC; 32]);
    }

    // -- Signing ------------------------------------------------------------

    #[test]
    fn signed_wire_verifies() {
        let signer = payer();
        let tx = build_sol_transfer(&signer.public_key(), &[0xBB; 32], 1_000_000, &[0xCC; 32])
            .unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();

        assert_eq!(signed.wire[0], 0x01);
        assert_eq!(&signed.wire[1..65], &signed.signature);

        let vk = VerifyingKey::from_bytes(&signer.public_key()).unwrap();
        let sig = Signature::from_bytes(&signed.signature);
        assert!(vk.verify_strict(&signed.wire[65..], &sig).is_ok());
    }

    #[test]
    fn transaction_id_is_base58_signature() {
        let signer = payer();
        let tx = build_sol_transfer(&signer.public_key(), &[3u8; 32], 7, &[4u8; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();
        let decoded = bs58::decode(signed.id()).into_vec().unwrap();
        assert_eq!(decoded, signed.signature.to_vec());
    }

    #[test]
    fn signing_is_deterministic() {
        let signer = payer();
        let tx = build_sol_transfer(&signer.public_key(), &[0x77; 32], 42, &[0x99; 32]).unwrap();
        let a = sign_transaction(&tx, &signer).unwrap();
        let b = sign_transaction(&tx, &signer).unwrap();
        assert_eq!(a.wire, b.wire);
    }

    #[test]
    fn signer_must_be_fee_payer() {
        let tx = build_sol_transfer(&[0x11; 32], &[0x22; 32], 42, &[0u8; 32]).unwrap();
        let err = sign_transaction(&tx, &payer()).unwrap_err();
        assert!(err.to_string().contains("fee payer"));
    }

    // -- Decoding -----------------------------------------------------------

    #[test]
    fn decode_recovers_signed_transaction() {
        let signer = payer();
        let tx = build_sol_transfer(&signer.public_key(), &[0xBB; 32], 5, &[0xDD; 32]).unwrap();
        let signed = sign_transaction(&tx, &signer).unwrap();

        let (signatures, decoded) = decode_transaction(&signed.wire).unwrap();
        assert_eq!(signatures, vec![signed.signature]);
        assert_eq!(decoded, tx);
    }

    #[test]
    fn decode_rejects_truncated_and_padded_input() {
        let signer = payer();
        let tx = build_sol_transfer(&signer.public_key(), &[0xBB; 32], 5, &[0xDD; 32]).unwrap();
        let wire = sign_transaction(&tx, &signer).unwrap().wire;

        assert!(decode_transaction(&wire[..wire.len() - 1]).is_err());
        let mut padded = wire.clone();
        padded.push(0);
        assert!(decode_transaction(&padded).is_err());
        assert!(decode_transaction(&[]).is_err());
    }
}
