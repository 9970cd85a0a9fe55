//! Fixed-point and rate math shared by every protocol decoder.

use alloy::primitives::U256;

/// Ray fixed-point scale (1e27).
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;
/// Wad fixed-point scale (1e18).
pub const WAD: u128 = 1_000_000_000_000_000_000;
/// 365-day year. No leap-year adjustment.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Lossy conversion of a 256-bit integer to f64.
pub fn u256_to_f64(v: U256) -> f64 {
    v.as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}

/// Saturating conversion for counters and caps.
pub fn u256_to_u64_saturating(v: U256) -> u64 {
    if v > U256::from(u64::MAX) {
        u64::MAX
    } else {
        v.to::<u64>()
    }
}

/// `raw / scale` keeping the fractional part that integer division drops.
fn div_scaled(raw: U256, scale: u128) -> f64 {
    let scale = U256::from(scale);
    let whole = raw / scale;
    let frac = raw % scale;
    u256_to_f64(whole) + u256_to_f64(frac) / u256_to_f64(scale)
}

/// Ray-scaled integer to a plain decimal (e.g. 5e25 → 0.05).
pub fn ray_to_decimal(raw: U256) -> f64 {
    div_scaled(raw, RAY)
}

/// Wad-scaled integer to a plain decimal (e.g. 8e17 → 0.8).
pub fn wad_to_decimal(raw: U256) -> f64 {
    div_scaled(raw, WAD)
}

/// `scaled_debt * index / RAY` in exact integer math; f64 if the product overflows.
pub fn scale_by_index(scaled: U256, index: U256) -> f64 {
    match scaled.checked_mul(index) {
        Some(product) => div_scaled(product, RAY),
        None => u256_to_f64(scaled) * ray_to_decimal(index),
    }
}

/// Per-second compounding over a year: `(1 + apr/N)^N - 1`, as a fraction.
///
/// Evaluated as `expm1(N * ln1p(apr/N))`, which is the same quantity without
/// the precision loss of raising `1 + tiny` to a huge power.
pub fn apr_to_apy(apr: f64) -> f64 {
    let n = SECONDS_PER_YEAR as f64;
    (n * (apr / n).ln_1p()).exp_m1()
}

/// Total value locked: borrowed plus still-available liquidity.
pub fn tvl(total_variable_debt: f64, available_liquidity: f64) -> f64 {
    total_variable_debt + available_liquidity
}

/// Borrowed share of TVL as a fraction. Zero TVL yields 0, never a division.
pub fn utilization(total_variable_debt: f64, tvl: f64) -> f64 {
    if tvl > 0.0 { total_variable_debt / tvl } else { 0.0 }
}

/// Presentation rounding to 2 decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
