//! Solana address encoding and validation.
//!
//! A Solana address is the Base58 encoding of a raw 32-byte Ed25519 public
//! key (or of an off-curve program-derived address). No hashing step.

use crate::error::SolError;

/// Validate a Solana address string.
///
/// Valid means: Base58 (Bitcoin alphabet) decoding to exactly 32 bytes.
pub fn validate_address(address: &str) -> Result<bool, SolError> {
    address_to_bytes(address).map(|_| true)
}

/// Decode a Solana address string to its 32-byte representation.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    if address.is_empty() {
        return Err(SolError::InvalidAddress("address is empty".into()));
    }

    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("{address}: base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("{address}: expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The System Program is 32 zero bytes.
    #[test]
    fn system_program_address() {
        assert_eq!(bytes_to_address(&[0u8; 32]), "11111111111111111111111111111111");
    }

    #[test]
    fn token_program_decodes_and_reencodes() {
        let address = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let bytes = address_to_bytes(address).unwrap();
        assert_eq!(bytes_to_address(&bytes), address);
    }

    #[test]
    fn validate_usdc_mint() {
        assert!(validate_address("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v").unwrap());
    }

    #[test]
    fn empty_address_is_rejected() {
        let err = address_to_bytes("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn non_base58_is_rejected() {
        // '0', 'O', 'I' and 'l' are not in the alphabet.
        assert!(validate_address("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl").is_err());
    }

    #[test]
    fn short_address_is_rejected() {
        let err = address_to_bytes("1").unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes, got 1"));
    }

    #[test]
    fn long_address_is_rejected() {
        let long = bs58::encode([7u8; 64]).into_string();
        assert!(validate_address(&long).is_err());
    }
}
