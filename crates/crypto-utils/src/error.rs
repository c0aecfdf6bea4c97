use thiserror::Error;

/// Errors raised while handling secret material.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid base64 encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_encoding() {
        let err = CryptoError::InvalidEncoding("Invalid byte 33, offset 0.".into());
        assert_eq!(
            err.to_string(),
            "invalid base64 encoding: Invalid byte 33, offset 0."
        );
    }

    #[test]
    fn display_invalid_input() {
        let err = CryptoError::InvalidInput("empty secret".into());
        assert_eq!(err.to_string(), "invalid input: empty secret");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CryptoError::InvalidInput("x".into()));
        assert!(err.to_string().contains('x'));
    }
}
