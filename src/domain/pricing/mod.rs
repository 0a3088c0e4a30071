//! Constant-product pricing math
//!
//! Integer-only arithmetic with floor division throughout. The rounding rule
//! is part of the contract: these amounts are settlement-exact and must match
//! what a constant-product venue would pay out, unit for unit.

use crate::shared::errors::SwapError;

/// Basis-point denominator shared by the fee and slippage helpers
const BPS_DENOMINATOR: u128 = 10_000;

/// The conventional constant-product venue fee: 0.3% (997/1000)
pub const STANDARD_FEE_BPS: u32 = 30;

/// Output amount a constant-product pool returns for `amount_in`, net of the
/// standard 0.3% fee.
///
/// With `a' = amount_in * 9970`:
///
/// ```text
/// amount_out = floor(a' * reserve_out / (reserve_in * 10000 + a'))
/// ```
///
/// which is the classic 997/1000 formula expressed in basis points.
pub fn amount_out(amount_in: u128, reserve_in: u128, reserve_out: u128) -> Result<u128, SwapError> {
    amount_out_with_fee(amount_in, reserve_in, reserve_out, STANDARD_FEE_BPS)
}

/// Same formula with an explicit venue fee, for venues that do not charge the
/// conventional 0.3%.
pub fn amount_out_with_fee(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee_bps: u32,
) -> Result<u128, SwapError> {
    if amount_in == 0 {
        return Err(SwapError::InvalidArgument(
            "amount_in must be positive".to_string(),
        ));
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(SwapError::InvalidArgument(
            "pool reserves must be positive".to_string(),
        ));
    }
    if fee_bps as u128 >= BPS_DENOMINATOR {
        return Err(SwapError::InvalidArgument(format!(
            "fee_bps out of range: {}",
            fee_bps
        )));
    }

    let keep = BPS_DENOMINATOR - fee_bps as u128;
    let amount_in_with_fee = amount_in
        .checked_mul(keep)
        .ok_or_else(|| overflow("amount_in"))?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or_else(|| overflow("numerator"))?;
    let denominator = reserve_in
        .checked_mul(BPS_DENOMINATOR)
        .and_then(|v| v.checked_add(amount_in_with_fee))
        .ok_or_else(|| overflow("denominator"))?;

    // Floor division is deliberate: rounding down matches venue settlement
    Ok(numerator / denominator)
}

/// Minimum acceptable output for a quoted amount under a slippage tolerance,
/// rounded down.
pub fn min_out(amount_out: u128, slippage_bps: u32) -> u128 {
    let keep = BPS_DENOMINATOR - (slippage_bps as u128).min(BPS_DENOMINATOR);
    match amount_out.checked_mul(keep) {
        Some(scaled) => scaled / BPS_DENOMINATOR,
        // Near-u128::MAX amounts: divide first, accept the coarser floor
        None => amount_out / BPS_DENOMINATOR * keep,
    }
}

fn overflow(what: &str) -> SwapError {
    SwapError::InvalidArgument(format!("arithmetic overflow computing {}", what))
}
