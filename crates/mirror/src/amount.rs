//! Exact 256-bit arithmetic over wei amounts stored as decimal strings
//!
//! On-chain values are `uint256`, so every amount that crosses the mirror is parsed
//! into a [`U256`]. Floating point is only used for the final, human-facing
//! progress percentage, and even that is derived from integer basis points.

use alloy::primitives::U256;

use crate::error::{MirrorError, Result};

const BASIS_POINTS: u64 = 10_000;
const WEI_DECIMALS: usize = 18;

/// Parse a caller-supplied amount: a decimal string, or `0x` hex
pub fn parse_amount(raw: &str) -> Result<U256> {
    let trimmed = raw.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16u64),
        None => (trimmed, 10u64),
    };

    let well_formed = !digits.is_empty()
        && digits.chars().all(|c| {
            if radix == 16 {
                c.is_ascii_hexdigit()
            } else {
                c.is_ascii_digit()
            }
        });
    if !well_formed {
        return Err(MirrorError::InvalidAmount(format!(
            "'{}' is not a non-negative integer",
            raw
        )));
    }

    U256::from_str_radix(digits, radix)
        .map_err(|e| MirrorError::InvalidAmount(format!("'{}': {}", raw, e)))
}

/// Parse an amount read back from storage; empty columns count as zero
pub fn parse_stored_amount(raw: &str) -> Result<U256> {
    if raw.trim().is_empty() {
        return Ok(U256::ZERO);
    }
    parse_amount(raw)
}

/// Sum stored amounts without loss of precision
pub fn sum_amounts<'a, I>(amounts: I) -> Result<U256>
where
    I: IntoIterator<Item = &'a str>,
{
    amounts.into_iter().try_fold(U256::ZERO, |total, raw| {
        let value = parse_stored_amount(raw)?;
        total
            .checked_add(value)
            .ok_or_else(|| MirrorError::InvalidAmount("sum exceeds 256 bits".to_string()))
    })
}

/// `minuend - subtrahend` rendered as a signed decimal string
pub fn signed_difference(minuend: U256, subtrahend: U256) -> String {
    if minuend >= subtrahend {
        (minuend - subtrahend).to_string()
    } else {
        format!("-{}", subtrahend - minuend)
    }
}

/// Integer average; zero when there is nothing to average
pub fn average(total: U256, count: u64) -> U256 {
    if count == 0 {
        U256::ZERO
    } else {
        total / U256::from(count)
    }
}

/// `current / goal` in basis points (1% = 100), zero when the goal is zero
pub fn progress_basis_points(current: U256, goal: U256) -> U256 {
    if goal.is_zero() {
        return U256::ZERO;
    }
    let scale = U256::from(BASIS_POINTS);
    if let Some(scaled) = current.checked_mul(scale) {
        return scaled / goal;
    }
    if goal >= scale {
        return current / (goal / scale);
    }
    // goal < 10^4, so the remainder term cannot overflow
    (current / goal)
        .checked_mul(scale)
        .and_then(|whole| whole.checked_add((current % goal) * scale / goal))
        .unwrap_or(U256::MAX)
}

/// Progress towards a goal as a percentage in `0.0..=100.0`
pub fn progress_percent(current: U256, goal: U256) -> f64 {
    let capped = std::cmp::min(
        progress_basis_points(current, goal),
        U256::from(BASIS_POINTS),
    );
    let basis_points = u64::try_from(capped).unwrap_or(BASIS_POINTS);
    basis_points as f64 / 100.0
}

/// Uncapped progress with two decimals, e.g. `"37.50"`; `"0"` for a zero goal
pub fn progress_label(current: U256, goal: U256) -> String {
    if goal.is_zero() {
        return "0".to_string();
    }
    let basis_points = progress_basis_points(current, goal);
    let hundred = U256::from(100u64);
    let cents = u64::try_from(basis_points % hundred).unwrap_or(0);
    format!("{}.{:02}", basis_points / hundred, cents)
}

/// Render wei as ether rounded half-up to `precision` decimals
pub fn format_ether(wei: U256, precision: usize) -> String {
    let precision = precision.min(WEI_DECIMALS);
    let ten = U256::from(10u64);
    let step = ten.pow(U256::from(WEI_DECIMALS - precision));

    let mut rounded = wei / step;
    if step > U256::from(1u64) && wei % step >= step / U256::from(2u64) {
        rounded += U256::from(1u64);
    }

    if precision == 0 {
        return rounded.to_string();
    }

    let scale = ten.pow(U256::from(precision));
    let fraction = u64::try_from(rounded % scale).unwrap_or(0);
    format!(
        "{}.{:0width$}",
        rounded / scale,
        fraction,
        width = precision
    )
}
