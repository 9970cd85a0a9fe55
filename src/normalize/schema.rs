//! Wire layouts for every supported protocol, in one place.
//!
//! These tables are the only place raw field positions and names appear. If
//! an upstream contract changes its return layout, this file is what breaks.

/// Fields the normalizer reads out of an Aave reserve tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveField {
    UnderlyingAsset,
    Name,
    Symbol,
    Decimals,
    BaseLtv,
    LiquidationThreshold,
    LiquidationBonus,
    VariableBorrowIndex,
    LiquidityRate,
    VariableBorrowRate,
    AvailableLiquidity,
    TotalScaledVariableDebt,
    BorrowCap,
    SupplyCap,
}

impl ReserveField {
    pub fn name(&self) -> &'static str {
        match self {
            ReserveField::UnderlyingAsset => "underlying_asset",
            ReserveField::Name => "name",
            ReserveField::Symbol => "symbol",
            ReserveField::Decimals => "decimals",
            ReserveField::BaseLtv => "base_ltv_as_collateral",
            ReserveField::LiquidationThreshold => "reserve_liquidation_threshold",
            ReserveField::LiquidationBonus => "reserve_liquidation_bonus",
            ReserveField::VariableBorrowIndex => "variable_borrow_index",
            ReserveField::LiquidityRate => "liquidity_rate",
            ReserveField::VariableBorrowRate => "variable_borrow_rate",
            ReserveField::AvailableLiquidity => "available_liquidity",
            ReserveField::TotalScaledVariableDebt => "total_scaled_variable_debt",
            ReserveField::BorrowCap => "borrow_cap",
            ReserveField::SupplyCap => "supply_cap",
        }
    }
}

/// A fixed positional layout: field → tuple index, plus the minimum length.
#[derive(Debug)]
pub struct PositionalSchema {
    pub layout: &'static str,
    pub min_len: usize,
    pub fields: &'static [(ReserveField, usize)],
}

impl PositionalSchema {
    pub fn index_of(&self, field: ReserveField) -> usize {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, i)| *i)
            .unwrap_or_else(|| unreachable!("{} missing from {} schema", field.name(), self.layout))
    }
}

/// Aave v3 `UiPoolDataProvider.getReservesData` → `AggregatedReserveData`.
///
/// Positions not listed here (flags, stable-rate fields, token addresses,
/// eMode data, ...) are carried through but never read.
pub const AAVE_V3_RESERVE: PositionalSchema = PositionalSchema {
    layout: "aave-v3 AggregatedReserveData",
    min_len: 38,
    fields: &[
        (ReserveField::UnderlyingAsset, 0),
        (ReserveField::Name, 1),
        (ReserveField::Symbol, 2),
        (ReserveField::Decimals, 3),
        (ReserveField::BaseLtv, 4),
        (ReserveField::LiquidationThreshold, 5),
        (ReserveField::LiquidationBonus, 6),
        (ReserveField::VariableBorrowIndex, 13),
        (ReserveField::LiquidityRate, 14),
        (ReserveField::VariableBorrowRate, 15),
        (ReserveField::AvailableLiquidity, 20),
        (ReserveField::TotalScaledVariableDebt, 21),
        (ReserveField::BorrowCap, 36),
        (ReserveField::SupplyCap, 37),
    ],
};

// ── Compound v3 (named) ──────────────────────────────────────────────

/// Keys the Compound gateway writes and the Compound decoder reads.
pub mod comet {
    pub const ASSET_ADDRESS: &str = "asset_address";
    pub const NAME: &str = "name";
    pub const SYMBOL: &str = "symbol";
    pub const DECIMALS: &str = "decimals";
    /// Protocol reserves, signed.
    pub const RESERVES: &str = "reserves";
    pub const TOTAL_SUPPLY: &str = "total_supply";
    pub const TOTAL_BORROW: &str = "total_borrow";
    /// Utilization as a wad fraction.
    pub const UTILIZATION: &str = "utilization";
    /// Per-second rate, wad.
    pub const SUPPLY_RATE: &str = "supply_rate";
    /// Per-second rate, wad.
    pub const BORROW_RATE: &str = "borrow_rate";
    pub const BORROW_COLLATERAL_FACTOR: &str = "borrow_collateral_factor";
    pub const LIQUIDATE_COLLATERAL_FACTOR: &str = "liquidate_collateral_factor";
    pub const LIQUIDATION_FACTOR: &str = "liquidation_factor";
    pub const SUPPLY_CAP: &str = "supply_cap";
    pub const BORROW_CAP: &str = "borrow_cap";

    /// Must be present for a market to decode.
    pub const REQUIRED: [&str; 5] = [DECIMALS, RESERVES, TOTAL_SUPPLY, TOTAL_BORROW, UTILIZATION];
}
