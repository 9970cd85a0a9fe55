#![allow(dead_code)]

use alloy::primitives::{Address, I256, U256, address};

use defi_liquidity_tracker::model::{RawAsset, RawField};
use defi_liquidity_tracker::normalize::math::{RAY, WAD};
use defi_liquidity_tracker::normalize::schema::comet;

pub const USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
pub const AAVE_TUPLE_LEN: usize = 38;

// ── Aave reserve tuples ──────────────────────────────────────────────

/// Knobs for one `AggregatedReserveData` tuple. Rates are annual fractions.
#[derive(Debug, Clone)]
pub struct AaveReserve {
    pub symbol: &'static str,
    pub decimals: u64,
    pub ltv: u64,
    pub liquidation_threshold: u64,
    pub liquidation_bonus: u64,
    pub variable_borrow_index: U256,
    pub liquidity_rate: f64,
    pub variable_borrow_rate: f64,
    pub available_liquidity: u128,
    pub scaled_variable_debt: u128,
    pub borrow_cap: u64,
    pub supply_cap: u64,
}

impl Default for AaveReserve {
    fn default() -> Self {
        AaveReserve {
            symbol: "USDC",
            decimals: 6,
            ltv: 8000,
            liquidation_threshold: 8250,
            liquidation_bonus: 10500,
            variable_borrow_index: U256::from(RAY),
            liquidity_rate: 0.05,
            variable_borrow_rate: 0.08,
            available_liquidity: 600_000_000,
            scaled_variable_debt: 400_000_000,
            borrow_cap: 1_000,
            supply_cap: 2_000,
        }
    }
}

/// Fraction to ray, exact for the handful of rates the tests use.
pub fn ray(rate: f64) -> U256 {
    let bps = (rate * 10_000.0).round() as u128;
    U256::from(bps * (RAY / 10_000))
}

impl AaveReserve {
    pub fn fields(&self) -> Vec<RawField> {
        let mut f: Vec<RawField> = (0..AAVE_TUPLE_LEN).map(|_| RawField::from(0u64)).collect();
        f[0] = USDC.into();
        f[1] = format!("{} Coin", self.symbol).into();
        f[2] = self.symbol.into();
        f[3] = self.decimals.into();
        f[4] = self.ltv.into();
        f[5] = self.liquidation_threshold.into();
        f[6] = self.liquidation_bonus.into();
        f[8] = true.into();
        f[13] = self.variable_borrow_index.into();
        f[14] = ray(self.liquidity_rate).into();
        f[15] = ray(self.variable_borrow_rate).into();
        f[20] = self.available_liquidity.into();
        f[21] = self.scaled_variable_debt.into();
        f[36] = self.borrow_cap.into();
        f[37] = self.supply_cap.into();
        f
    }

    pub fn raw(&self) -> RawAsset {
        RawAsset::Positional(self.fields())
    }
}

// ── Comet market records ─────────────────────────────────────────────

/// Annual fraction to Comet's per-second wad rate.
pub fn per_second(rate: f64) -> U256 {
    U256::from((rate / 31_536_000.0 * WAD as f64).round() as u128)
}

pub fn wad(x: f64) -> U256 {
    U256::from((x * WAD as f64).round() as u128)
}

pub fn comet_market(reserves: i64) -> RawAsset {
    comet_market_with(reserves, 1_000_000_000_000, 750_000_000_000, wad(0.75))
}

pub fn comet_market_with(
    reserves: i64,
    total_supply: u128,
    total_borrow: u128,
    utilization: U256,
) -> RawAsset {
    [
        (comet::ASSET_ADDRESS, RawField::from(USDC)),
        (comet::NAME, "USD Coin".into()),
        (comet::SYMBOL, "USDC".into()),
        (comet::DECIMALS, 6u64.into()),
        (comet::RESERVES, I256::try_from(reserves).unwrap().into()),
        (comet::TOTAL_SUPPLY, total_supply.into()),
        (comet::TOTAL_BORROW, total_borrow.into()),
        (comet::UTILIZATION, utilization.into()),
        (comet::SUPPLY_RATE, per_second(0.03).into()),
        (comet::BORROW_RATE, per_second(0.045).into()),
        (comet::BORROW_COLLATERAL_FACTOR, wad(0.8).into()),
        (comet::LIQUIDATE_COLLATERAL_FACTOR, wad(0.85).into()),
        (comet::LIQUIDATION_FACTOR, wad(0.93).into()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
