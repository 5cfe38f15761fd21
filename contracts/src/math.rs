//! Fixed-point helpers for RAY-denominated rates, prices and growth factors.
//!
//! All rates handled by the protocol (money market spot and accumulated rate,
//! savings index, fyDai growth factors) use 27 decimals. Amounts are plain
//! token units. Every helper is overflow-checked and reports the failure
//! instead of wrapping.

use odra::casper_types::U256;
use crate::errors::CdpError;
use crate::types::SignedAmount;

/// Fixed-point unit (1e27)
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Convenience result for math helpers
pub type MathResult = Result<U256, CdpError>;

/// `RAY` as a `U256`
pub fn ray() -> U256 {
    U256::from(RAY)
}

/// Multiply an amount by a RAY factor, rounding down.
pub fn muld(x: U256, y: U256) -> MathResult {
    x.checked_mul(y)
        .map(|v| v / ray())
        .ok_or(CdpError::MathOverflow)
}

/// Divide an amount by a RAY factor, rounding down.
pub fn divd(x: U256, y: U256) -> MathResult {
    if y.is_zero() {
        return Err(CdpError::DivisionByZero);
    }
    x.checked_mul(ray())
        .map(|v| v / y)
        .ok_or(CdpError::MathOverflow)
}

/// Multiply an amount by a RAY factor, rounding up.
pub fn muldrup(x: U256, y: U256) -> MathResult {
    let product = x.checked_mul(y).ok_or(CdpError::MathOverflow)?;
    Ok(div_round_up(product, ray()))
}

/// Divide an amount by a RAY factor, rounding up.
pub fn divdrup(x: U256, y: U256) -> MathResult {
    if y.is_zero() {
        return Err(CdpError::DivisionByZero);
    }
    let scaled = x.checked_mul(ray()).ok_or(CdpError::MathOverflow)?;
    Ok(div_round_up(scaled, y))
}

pub fn add(x: U256, y: U256) -> MathResult {
    x.checked_add(y).ok_or(CdpError::MathOverflow)
}

pub fn sub(x: U256, y: U256) -> MathResult {
    x.checked_sub(y).ok_or(CdpError::MathUnderflow)
}

/// Largest magnitude representable by a signed 256-bit integer.
pub fn max_signed() -> U256 {
    U256::MAX / U256::from(2u64)
}

/// Checked cast of an unsigned amount into a signed delta.
///
/// Fails instead of wrapping when the amount does not fit in `int256`.
pub fn to_signed(amount: U256, negative: bool) -> Result<SignedAmount, CdpError> {
    if amount > max_signed() {
        return Err(CdpError::SignedCastOverflow);
    }
    Ok(SignedAmount {
        magnitude: amount,
        // `-0` is normalized so zero deltas compare equal
        negative: negative && !amount.is_zero(),
    })
}

fn div_round_up(numerator: U256, denominator: U256) -> U256 {
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        quotient
    } else {
        quotient + U256::one()
    }
}
