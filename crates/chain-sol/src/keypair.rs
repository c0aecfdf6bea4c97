//! Ed25519 keypairs in the shape Solana tooling passes them around.
//!
//! The canonical secret layout is 64 bytes: `seed (32) || public key (32)`.
//! A bare 32-byte seed is accepted too; the public half is then recomputed.

use ed25519_dalek::{Signature, Signer, SigningKey};
use zeroize::Zeroizing;

use crate::address::bytes_to_address;
use crate::error::SolError;

/// A Solana signing keypair. Secret material is wiped on drop by
/// `ed25519-dalek`.
pub struct SolKeypair {
    signing_key: SigningKey,
}

impl SolKeypair {
    /// Generate a fresh keypair from OS randomness.
    pub fn generate() -> Self {
        let seed = crypto_utils::random::random_seed();
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Build a keypair from raw secret bytes (32-byte seed or 64-byte
    /// `seed || pubkey`). For the 64-byte form the trailing public key must
    /// match the one derived from the seed.
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, SolError> {
        let signing_key = match secret.len() {
            32 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(secret);
                SigningKey::from_bytes(&seed)
            }
            64 => {
                let mut pair = Zeroizing::new([0u8; 64]);
                pair.copy_from_slice(secret);
                SigningKey::from_keypair_bytes(&pair).map_err(|_| {
                    SolError::InvalidPrivateKey(
                        "public key half does not match the seed".into(),
                    )
                })?
            }
            n => {
                return Err(SolError::InvalidPrivateKey(format!(
                    "expected 32 or 64 bytes, got {n}"
                )))
            }
        };

        Ok(Self { signing_key })
    }

    /// Decode a base64 secret and build the keypair from it.
    pub fn from_base64(encoded: &str) -> Result<Self, SolError> {
        let secret = crypto_utils::decode_secret(encoded)?;
        Self::from_secret_bytes(&secret)
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Base58 address of the public key.
    pub fn address(&self) -> String {
        bytes_to_address(&self.public_key())
    }

    /// The 64-byte `seed || pubkey` form.
    pub fn to_keypair_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl std::fmt::Debug for SolKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
