use alloy::primitives::U256;

use crate::model::{FieldKind, ProtocolId, RawAsset, RawField};

use super::math;
use super::schema::{AAVE_V3_RESERVE, ReserveField};
use super::{DecodeError, DecodedAsset};

/// Decode one `AggregatedReserveData` tuple.
pub(super) fn decode(asset: &RawAsset) -> Result<DecodedAsset, DecodeError> {
    let fields = match asset {
        RawAsset::Positional(fields) => fields.as_slice(),
        other => {
            return Err(DecodeError::LayoutMismatch {
                protocol: ProtocolId::Aave,
                expected: "positional",
                actual: other.layout(),
            });
        }
    };

    if fields.len() < AAVE_V3_RESERVE.min_len {
        return Err(DecodeError::TooShort {
            layout: AAVE_V3_RESERVE.layout,
            expected: AAVE_V3_RESERVE.min_len,
            actual: fields.len(),
        });
    }
    let t = Tuple(fields);

    let decimals = t.uint(ReserveField::Decimals)?;
    if decimals > U256::from(u8::MAX) {
        return Err(DecodeError::OutOfRange {
            field: ReserveField::Decimals.name(),
            reason: format!("{decimals} does not fit in u8"),
        });
    }

    let variable_borrow_index = t.uint(ReserveField::VariableBorrowIndex)?;
    let scaled_debt = t.uint(ReserveField::TotalScaledVariableDebt)?;

    Ok(DecodedAsset {
        address: t.address(ReserveField::UnderlyingAsset)?,
        name: t.string(ReserveField::Name)?,
        symbol: t.string(ReserveField::Symbol)?,
        decimals: decimals.to::<u8>(),
        ltv_percent: bps_to_percent(t.uint(ReserveField::BaseLtv)?),
        liquidation_threshold_percent: bps_to_percent(t.uint(ReserveField::LiquidationThreshold)?),
        liquidation_bonus: math::u256_to_u64_saturating(t.uint(ReserveField::LiquidationBonus)?),
        lending_apr: math::ray_to_decimal(t.uint(ReserveField::LiquidityRate)?),
        variable_borrow_apr: math::ray_to_decimal(t.uint(ReserveField::VariableBorrowRate)?),
        total_variable_debt: math::scale_by_index(scaled_debt, variable_borrow_index),
        available_liquidity: math::u256_to_f64(t.uint(ReserveField::AvailableLiquidity)?),
        reported_tvl: None,
        reported_utilization: None,
        borrow_cap: math::u256_to_u64_saturating(t.uint(ReserveField::BorrowCap)?),
        supply_cap: math::u256_to_u64_saturating(t.uint(ReserveField::SupplyCap)?),
        anomalies: Vec::new(),
    })
}

/// Basis-point-like integer to percent (8000 → 80.0).
fn bps_to_percent(raw: U256) -> f64 {
    math::u256_to_f64(raw) / 100.0
}

/// Length-checked view over a reserve tuple, indexed through the schema.
struct Tuple<'a>(&'a [RawField]);

impl Tuple<'_> {
    fn get(&self, field: ReserveField) -> &RawField {
        &self.0[AAVE_V3_RESERVE.index_of(field)]
    }

    fn wrong_kind(&self, field: ReserveField, expected: FieldKind) -> DecodeError {
        DecodeError::WrongKind {
            field: field.name(),
            expected,
            actual: self.get(field).kind(),
        }
    }

    fn uint(&self, field: ReserveField) -> Result<U256, DecodeError> {
        self.get(field)
            .as_uint()
            .ok_or_else(|| self.wrong_kind(field, FieldKind::Uint))
    }

    fn string(&self, field: ReserveField) -> Result<String, DecodeError> {
        self.get(field)
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.wrong_kind(field, FieldKind::Str))
    }

    fn address(&self, field: ReserveField) -> Result<String, DecodeError> {
        self.get(field)
            .as_address()
            .map(|a| a.to_string())
            .ok_or_else(|| self.wrong_kind(field, FieldKind::Address))
    }
}
