use std::collections::BTreeMap;

use alloy::primitives::U256;

use crate::model::{FieldKind, ProtocolId, RawAsset, RawField};

use super::math::{self, SECONDS_PER_YEAR};
use super::schema::comet;
use super::{AnomalyKind, DecodeError, DecodedAsset};

/// Decode one Comet market record (named fields).
pub(super) fn decode(asset: &RawAsset) -> Result<DecodedAsset, DecodeError> {
    let map = match asset {
        RawAsset::Named(map) => map,
        other => {
            return Err(DecodeError::LayoutMismatch {
                protocol: ProtocolId::Compound,
                expected: "named",
                actual: other.layout(),
            });
        }
    };
    let r = Record(map);

    for key in comet::REQUIRED {
        if !map.contains_key(key) {
            return Err(DecodeError::MissingField { field: key });
        }
    }

    let decimals = r.uint(comet::DECIMALS)?;
    if decimals > U256::from(u8::MAX) {
        return Err(DecodeError::OutOfRange {
            field: comet::DECIMALS,
            reason: format!("{decimals} does not fit in u8"),
        });
    }

    let reserves = r
        .get(comet::RESERVES)
        .and_then(RawField::as_int)
        .ok_or_else(|| r.wrong_kind(comet::RESERVES, FieldKind::Int))?;
    let mut anomalies = Vec::new();
    if reserves.is_negative() {
        anomalies.push(AnomalyKind::NegativeReserves);
    }

    let total_supply = r.uint(comet::TOTAL_SUPPLY)?;
    let total_borrow = r.uint(comet::TOTAL_BORROW)?;
    let available = total_supply.saturating_sub(total_borrow);
    if total_borrow > total_supply {
        anomalies.push(AnomalyKind::BorrowExceedsSupply);
    }

    let utilization = math::wad_to_decimal(r.uint(comet::UTILIZATION)?);
    if utilization > 1.0 {
        anomalies.push(AnomalyKind::UtilizationAboveOne {
            reported_percent: utilization * 100.0,
        });
    }

    Ok(DecodedAsset {
        address: r.optional_address(comet::ASSET_ADDRESS)?,
        name: r.optional_string(comet::NAME)?,
        symbol: r.optional_string(comet::SYMBOL)?,
        decimals: decimals.to::<u8>(),
        ltv_percent: wad_to_percent(r.optional_uint(comet::BORROW_COLLATERAL_FACTOR)?),
        liquidation_threshold_percent: wad_to_percent(
            r.optional_uint(comet::LIQUIDATE_COLLATERAL_FACTOR)?,
        ),
        liquidation_bonus: wad_to_bps(r.optional_uint(comet::LIQUIDATION_FACTOR)?),
        lending_apr: per_second_to_apr(r.optional_uint(comet::SUPPLY_RATE)?),
        variable_borrow_apr: per_second_to_apr(r.optional_uint(comet::BORROW_RATE)?),
        total_variable_debt: math::u256_to_f64(total_borrow),
        available_liquidity: math::u256_to_f64(available),
        reported_tvl: Some(math::u256_to_f64(total_supply)),
        reported_utilization: Some(utilization.min(1.0)),
        borrow_cap: math::u256_to_u64_saturating(r.optional_uint(comet::BORROW_CAP)?),
        supply_cap: math::u256_to_u64_saturating(r.optional_uint(comet::SUPPLY_CAP)?),
        anomalies,
    })
}

/// Wad per-second rate to a simple annual rate.
fn per_second_to_apr(rate: U256) -> f64 {
    math::wad_to_decimal(rate) * SECONDS_PER_YEAR as f64
}

fn wad_to_percent(raw: U256) -> f64 {
    math::wad_to_decimal(raw) * 100.0
}

/// Wad factor to the basis-point scale Aave uses for its bonus (0.93e18 → 9300).
fn wad_to_bps(raw: U256) -> u64 {
    (math::wad_to_decimal(raw) * 10_000.0).round() as u64
}

struct Record<'a>(&'a BTreeMap<String, RawField>);

impl Record<'_> {
    fn get(&self, key: &str) -> Option<&RawField> {
        self.0.get(key)
    }

    fn wrong_kind(&self, key: &'static str, expected: FieldKind) -> DecodeError {
        match self.get(key) {
            Some(v) => DecodeError::WrongKind {
                field: key,
                expected,
                actual: v.kind(),
            },
            None => DecodeError::MissingField { field: key },
        }
    }

    fn uint(&self, key: &'static str) -> Result<U256, DecodeError> {
        self.get(key)
            .and_then(RawField::as_uint)
            .ok_or_else(|| self.wrong_kind(key, FieldKind::Uint))
    }

    fn optional_uint(&self, key: &'static str) -> Result<U256, DecodeError> {
        match self.get(key) {
            None => Ok(U256::ZERO),
            Some(_) => self.uint(key),
        }
    }

    fn optional_string(&self, key: &'static str) -> Result<String, DecodeError> {
        match self.get(key) {
            None => Ok(String::new()),
            Some(v) => v
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| self.wrong_kind(key, FieldKind::Str)),
        }
    }

    fn optional_address(&self, key: &'static str) -> Result<String, DecodeError> {
        match self.get(key) {
            None => Ok(String::new()),
            Some(v) => v
                .as_address()
                .map(|a| a.to_string())
                .ok_or_else(|| self.wrong_kind(key, FieldKind::Address)),
        }
    }
}
