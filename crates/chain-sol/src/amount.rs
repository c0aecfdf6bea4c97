//! Decimal amount → integer base units.
//!
//! Rounding is half away from zero (`f64::round`). The product
//! `amount * 10^scale` is computed in binary floating point, so very large
//! amounts or scales can land one base unit away from the decimal answer.
//! That loss is inherent to accepting JSON numbers and is not corrected here.

use crate::error::SolError;

/// Decimal places of the native token (lamports per SOL).
pub const LAMPORTS_SCALE: u8 = 9;

/// 2^64, the first value that no longer fits in a `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Convert a decimal-facing amount to base units.
///
/// Fails with `InvalidAmount` for NaN, infinities and negative values, and
/// with `AmountOverflow` when the scaled value does not fit in a `u64`.
pub fn normalize(amount: f64, scale: u8) -> Result<u64, SolError> {
    if !amount.is_finite() {
        return Err(SolError::InvalidAmount(format!("{amount} is not a finite number")));
    }
    if amount < 0.0 {
        return Err(SolError::InvalidAmount(format!("{amount} is negative")));
    }

    let scaled = (amount * 10f64.powi(i32::from(scale))).round();
    if !scaled.is_finite() || scaled >= U64_LIMIT {
        return Err(SolError::AmountOverflow { amount, scale });
    }

    Ok(scaled as u64)
}

/// Validate a JSON-supplied scale: finite, non-negative, integral, and small
/// enough for the one-byte `decimals` field of `TransferChecked`.
pub fn parse_scale(scale: f64) -> Result<u8, SolError> {
    if !scale.is_finite() {
        return Err(SolError::InvalidScale(format!("{scale} is not a finite number")));
    }
    if scale < 0.0 {
        return Err(SolError::InvalidScale(format!("{scale} is negative")));
    }
    if scale.fract() != 0.0 {
        return Err(SolError::InvalidScale(format!("{scale} is not an integer")));
    }
    if scale > f64::from(u8::MAX) {
        return Err(SolError::InvalidScale(format!("{scale} exceeds {}", u8::MAX)));
    }
    Ok(scale as u8)
}
