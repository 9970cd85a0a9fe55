mod fixtures;

use alloy::primitives::U256;
use chrono::{TimeZone, Utc};

use defi_liquidity_tracker::model::{ProtocolId, RawAsset, RawField};
use defi_liquidity_tracker::normalize::{
    AnomalyKind, DecodeError, NormalizeError, normalize, normalize_at, normalize_str,
};

use fixtures::*;

fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn expected_apy_percent(apr: f64) -> f64 {
    let n = 31_536_000f64;
    ((1.0 + apr / n).powf(n) - 1.0) * 100.0
}

// ── Aave ─────────────────────────────────────────────────────────────

#[test]
fn test_aave_reserve_is_normalized() {
    let report = normalize_at(
        ProtocolId::Aave,
        "ethereum",
        Some("core"),
        &[AaveReserve::default().raw()],
        fixed_time(),
    );
    assert!(report.is_complete());
    assert!(report.anomalies.is_empty());
    let r = &report.records[0];

    assert_eq!(r.protocol, ProtocolId::Aave);
    assert_eq!(r.network, "ethereum");
    assert_eq!(r.market.as_deref(), Some("core"));
    assert_eq!(r.symbol, "USDC");
    assert_eq!(r.asset_name, "USDC Coin");
    assert_eq!(r.asset_address, USDC.to_string());
    assert_eq!(r.decimals, 6);
    assert_eq!(r.ltv_percent, 80.00);
    assert_eq!(r.liquidation_threshold_percent, 82.50);
    assert_eq!(r.liquidation_bonus, 10500);
    assert_eq!(r.tvl, 1_000_000_000.0);
    assert_eq!(r.total_variable_debt, 400_000_000.0);
    assert_eq!(r.utilization_rate_percent, 40.00);
    assert_eq!(r.lending_apy_percent, 5.13);
    assert_eq!(r.variable_borrow_apy_percent, 8.33);
    assert_eq!(r.spread_percent, 3.20);
    assert_eq!(r.borrow_cap, 1_000);
    assert_eq!(r.supply_cap, 2_000);
    assert_eq!(r.load_datetime, fixed_time());
}

#[test]
fn test_five_percent_apr_compounds_per_second() {
    let report = normalize(ProtocolId::Aave, "ethereum", None, &[AaveReserve::default().raw()]);
    let want = (expected_apy_percent(0.05) * 100.0).round() / 100.0;
    assert_eq!(report.records[0].lending_apy_percent, want);
}

#[test]
fn test_apy_never_below_apr() {
    for rate in [0.0, 0.001, 0.02, 0.05, 0.15, 0.5] {
        let reserve = AaveReserve {
            liquidity_rate: rate,
            variable_borrow_rate: rate,
            ..Default::default()
        };
        let r = &normalize(ProtocolId::Aave, "ethereum", None, &[reserve.raw()]).records[0];
        assert!(r.lending_apy_percent >= (rate * 100.0 * 100.0).round() / 100.0, "rate {rate}");
    }
}

#[test]
fn test_borrow_index_scales_debt() {
    // index 1.1: 400M scaled → 440M actual
    let reserve = AaveReserve {
        variable_borrow_index: U256::from(11u64) * U256::from(RAY_TENTH),
        ..Default::default()
    };
    let r = &normalize(ProtocolId::Aave, "ethereum", None, &[reserve.raw()]).records[0];
    assert_eq!(r.total_variable_debt, 440_000_000.0);
    assert_eq!(r.tvl, 1_040_000_000.0);
    assert_eq!(r.utilization_rate_percent, 42.31);
}

const RAY_TENTH: u128 = defi_liquidity_tracker::normalize::math::RAY / 10;

#[test]
fn test_empty_reserve_has_zero_utilization() {
    let reserve = AaveReserve {
        available_liquidity: 0,
        scaled_variable_debt: 0,
        ..Default::default()
    };
    let r = &normalize(ProtocolId::Aave, "ethereum", None, &[reserve.raw()]).records[0];
    assert_eq!(r.tvl, 0.0);
    assert_eq!(r.utilization_rate_percent, 0.0);
}

#[test]
fn test_utilization_stays_in_range() {
    for (available, debt) in [(0u128, 1u128), (1, 0), (5, 5), (1_000_000, 1), (1, 1_000_000)] {
        let reserve = AaveReserve {
            available_liquidity: available,
            scaled_variable_debt: debt,
            ..Default::default()
        };
        let r = &normalize(ProtocolId::Aave, "ethereum", None, &[reserve.raw()]).records[0];
        assert!((0.0..=100.0).contains(&r.utilization_rate_percent));
    }
}

#[test]
fn test_inverted_rates_flag_negative_spread() {
    let reserve = AaveReserve {
        liquidity_rate: 0.06,
        variable_borrow_rate: 0.04,
        ..Default::default()
    };
    let report = normalize(ProtocolId::Aave, "ethereum", None, &[reserve.raw()]);
    assert_eq!(report.records.len(), 1);
    assert!(report.records[0].spread_percent < 0.0);
    assert_eq!(report.anomalies.len(), 1);
    assert!(matches!(
        report.anomalies[0].kind,
        AnomalyKind::NegativeSpread { .. }
    ));
}

// ── Malformed input ──────────────────────────────────────────────────

#[test]
fn test_short_tuple_is_skipped_not_fatal() {
    let mut short = AaveReserve::default().fields();
    short.truncate(10);
    let raw = vec![
        AaveReserve::default().raw(),
        RawAsset::Positional(short),
        AaveReserve { symbol: "DAI", ..Default::default() }.raw(),
    ];
    let report = normalize(ProtocolId::Aave, "ethereum", None, &raw);

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[1].symbol, "DAI");
    assert_eq!(report.skipped.len(), 1);
    let skipped = &report.skipped[0];
    assert_eq!(skipped.index, 1);
    assert_eq!(skipped.label.as_deref(), Some("USDC"));
    assert!(matches!(
        skipped.error,
        DecodeError::TooShort { expected: 38, actual: 10, .. }
    ));
}

#[test]
fn test_wrong_kind_is_skipped() {
    let mut fields = AaveReserve::default().fields();
    fields[14] = RawField::from("not a rate");
    let report = normalize(ProtocolId::Aave, "ethereum", None, &[RawAsset::Positional(fields)]);
    assert!(report.records.is_empty());
    assert!(matches!(
        report.skipped[0].error,
        DecodeError::WrongKind { field: "liquidity_rate", .. }
    ));
}

#[test]
fn test_layout_mismatch_is_skipped() {
    let report = normalize(ProtocolId::Aave, "ethereum", None, &[comet_market(1)]);
    assert!(report.records.is_empty());
    assert!(matches!(
        report.skipped[0].error,
        DecodeError::LayoutMismatch { protocol: ProtocolId::Aave, .. }
    ));

    let report = normalize(ProtocolId::Compound, "ethereum", None, &[AaveReserve::default().raw()]);
    assert!(matches!(
        report.skipped[0].error,
        DecodeError::LayoutMismatch { protocol: ProtocolId::Compound, .. }
    ));
}

#[test]
fn test_empty_input_gives_empty_report() {
    let report = normalize(ProtocolId::Aave, "ethereum", None, &[]);
    assert!(report.records.is_empty());
    assert!(report.is_complete());
}

// ── Dispatch ─────────────────────────────────────────────────────────

#[test]
fn test_unknown_protocol_is_rejected_before_decoding() {
    let err = normalize_str("maker", "ethereum", None, &[AaveReserve::default().raw()]).unwrap_err();
    assert_eq!(err, NormalizeError::UnsupportedProtocol("maker".into()));
}

#[test]
fn test_protocol_names_are_case_insensitive() {
    let report = normalize_str("AAVE", "ethereum", None, &[AaveReserve::default().raw()]).unwrap();
    assert_eq!(report.records.len(), 1);
    let report = normalize_str("Compound", "ethereum", None, &[comet_market(1)]).unwrap();
    assert_eq!(report.records.len(), 1);
}

#[test]
fn test_normalize_is_deterministic_apart_from_timestamp() {
    let raw = vec![
        AaveReserve::default().raw(),
        AaveReserve { symbol: "WETH", decimals: 18, ..Default::default() }.raw(),
    ];
    let a = normalize(ProtocolId::Aave, "base", None, &raw);
    let b = normalize(ProtocolId::Aave, "base", None, &raw);
    assert_eq!(a.records.len(), b.records.len());
    for (x, y) in a.records.iter().zip(&b.records) {
        assert!(x.same_metrics(y));
    }
    assert_eq!(a.records[1].symbol, "WETH");
}

// ── Compound ─────────────────────────────────────────────────────────

#[test]
fn test_comet_market_is_normalized() {
    let report = normalize_at(
        ProtocolId::Compound,
        "ethereum",
        Some("usdc"),
        &[comet_market(5_000_000)],
        fixed_time(),
    );
    assert!(report.is_complete());
    assert!(report.anomalies.is_empty());
    let r = &report.records[0];

    assert_eq!(r.protocol, ProtocolId::Compound);
    assert_eq!(r.symbol, "USDC");
    assert_eq!(r.tvl, 1_000_000_000_000.0);
    assert_eq!(r.total_variable_debt, 750_000_000_000.0);
    assert_eq!(r.utilization_rate_percent, 75.00);
    assert_eq!(r.lending_apy_percent, 3.05);
    assert_eq!(r.variable_borrow_apy_percent, 4.60);
    assert_eq!(r.spread_percent, 1.56);
    assert_eq!(r.ltv_percent, 80.00);
    assert_eq!(r.liquidation_threshold_percent, 85.00);
    assert_eq!(r.liquidation_bonus, 9300);
}

#[test]
fn test_negative_reserves_are_reported() {
    let report = normalize(ProtocolId::Compound, "ethereum", None, &[comet_market(-42)]);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.anomalies.len(), 1);
    assert_eq!(report.anomalies[0].kind, AnomalyKind::NegativeReserves);
    assert_eq!(report.anomalies[0].symbol, "USDC");
}

#[test]
fn test_comet_missing_required_field_is_skipped() {
    let RawAsset::Named(mut map) = comet_market(1) else {
        unreachable!()
    };
    map.remove("total_borrow");
    let report = normalize(ProtocolId::Compound, "ethereum", None, &[RawAsset::Named(map)]);
    assert!(report.records.is_empty());
    assert_eq!(
        report.skipped[0].error,
        DecodeError::MissingField { field: "total_borrow" }
    );
}

#[test]
fn test_comet_optional_fields_default_to_zero() {
    let RawAsset::Named(map) = comet_market(1) else {
        unreachable!()
    };
    let minimal: RawAsset = map
        .into_iter()
        .filter(|(k, _)| {
            ["decimals", "reserves", "total_supply", "total_borrow", "utilization"]
                .contains(&k.as_str())
        })
        .collect();
    let report = normalize(ProtocolId::Compound, "ethereum", None, &[minimal]);
    let r = &report.records[0];
    assert_eq!(r.symbol, "");
    assert_eq!(r.lending_apy_percent, 0.0);
    assert_eq!(r.ltv_percent, 0.0);
    assert_eq!(r.borrow_cap, 0);
}

#[test]
fn test_comet_tvl_is_total_supply_even_when_overborrowed() {
    let raw = comet_market_with(1, 100, 150, wad(0.75));
    let report = normalize(ProtocolId::Compound, "ethereum", None, &[raw]);
    let r = &report.records[0];
    assert_eq!(r.tvl, 100.0);
    assert_eq!(r.total_variable_debt, 150.0);
    assert!(
        report
            .anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::BorrowExceedsSupply)
    );
}

#[test]
fn test_comet_utilization_above_one_is_clamped_and_reported() {
    let raw = comet_market_with(1, 1_000, 500, wad(2.0));
    let report = normalize(ProtocolId::Compound, "ethereum", None, &[raw]);
    let r = &report.records[0];
    assert_eq!(r.utilization_rate_percent, 100.0);
    assert_eq!(report.anomalies.len(), 1);
    assert!(matches!(
        report.anomalies[0].kind,
        AnomalyKind::UtilizationAboveOne { reported_percent } if reported_percent == 200.0
    ));
}
