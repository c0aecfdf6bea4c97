use thiserror::Error;

/// Solana chain operation errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("no valid bump seed found: {0}")]
    DerivationExhausted(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid scale: {0}")]
    InvalidScale(String),

    #[error("amount overflow: {amount} scaled by 10^{scale} exceeds u64")]
    AmountOverflow { amount: f64, scale: u8 },

    #[error("invalid instruction input: {0}")]
    InvalidInstructionInput(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl SolError {
    /// Whether the error comes from caller-supplied input (as opposed to a
    /// fault while building or encoding the transaction).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SolError::InvalidPrivateKey(_)
                | SolError::InvalidAddress(_)
                | SolError::DerivationExhausted(_)
                | SolError::InvalidAmount(_)
                | SolError::InvalidScale(_)
                | SolError::AmountOverflow { .. }
                | SolError::InvalidInstructionInput(_)
        )
    }
}

impl From<crypto_utils::CryptoError> for SolError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        SolError::InvalidPrivateKey(e.to_string())
    }
}
