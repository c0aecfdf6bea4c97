//! # crypto-utils
//!
//! Secret decoding, memory hygiene, and secure random generation for the
//! Solana gateway. Nothing in here knows about Solana itself.

pub mod error;
pub mod random;
pub mod secret;
pub mod zeroizing;

pub use error::CryptoError;
pub use secret::{decode_secret, encode_secret};
pub use zeroizing::{ZeroizingBytes, ZeroizingString};
