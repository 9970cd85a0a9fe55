//! Turns raw, protocol-specific reserve state into uniform `AssetMetricRecord`s.
//!
//! Pure and synchronous: no I/O, no shared state. Safe to call from many
//! tasks at once on independent inputs.

mod aave;
mod compound;
mod error;
pub mod math;
pub mod schema;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::model::{AssetMetricRecord, ProtocolId, RawAsset};

pub use error::{DecodeError, NormalizeError};

// ── Report types ─────────────────────────────────────────────────────

/// An asset that was dropped from the batch, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAsset {
    /// Position in the input sequence.
    pub index: usize,
    pub label: Option<String>,
    pub error: DecodeError,
}

/// Data that decoded fine but looks wrong upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum AnomalyKind {
    /// Borrow APY below lending APY.
    NegativeSpread { spread_percent: f64 },
    /// Protocol reserves reported below zero.
    NegativeReserves,
    /// Total borrow above total supply.
    BorrowExceedsSupply,
    /// Upstream utilization above 100%, clamped before use.
    UtilizationAboveOne { reported_percent: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub index: usize,
    pub symbol: String,
    pub kind: AnomalyKind,
}

/// Output of one normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    /// One record per successfully decoded asset, in input order.
    pub records: Vec<AssetMetricRecord>,
    pub skipped: Vec<SkippedAsset>,
    pub anomalies: Vec<Anomaly>,
}

impl NormalizeReport {
    /// True when no asset was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

// ── Decoded intermediate ─────────────────────────────────────────────

/// Protocol-neutral view of one asset, full precision, before derivation.
#[derive(Debug, Clone)]
pub(crate) struct DecodedAsset {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub ltv_percent: f64,
    pub liquidation_threshold_percent: f64,
    pub liquidation_bonus: u64,
    pub lending_apr: f64,
    pub variable_borrow_apr: f64,
    pub total_variable_debt: f64,
    pub available_liquidity: f64,
    /// TVL reported upstream, if the protocol tracks it directly.
    pub reported_tvl: Option<f64>,
    /// Utilization already computed upstream (fraction), if the protocol reports one.
    pub reported_utilization: Option<f64>,
    pub borrow_cap: u64,
    pub supply_cap: u64,
    pub anomalies: Vec<AnomalyKind>,
}

type DecodeFn = fn(&RawAsset) -> Result<DecodedAsset, DecodeError>;

impl ProtocolId {
    /// Decoder for this protocol's raw layout.
    fn decoder(self) -> DecodeFn {
        match self {
            ProtocolId::Aave => aave::decode,
            ProtocolId::Compound => compound::decode,
        }
    }
}

// ── Public API ───────────────────────────────────────────────────────

/// Normalize a batch using the current UTC time as `load_datetime`.
pub fn normalize(
    protocol: ProtocolId,
    network: &str,
    market: Option<&str>,
    raw: &[RawAsset],
) -> NormalizeReport {
    normalize_at(protocol, network, market, raw, Utc::now())
}

/// String-keyed entry point. An unknown protocol fails before any decoding.
pub fn normalize_str(
    protocol: &str,
    network: &str,
    market: Option<&str>,
    raw: &[RawAsset],
) -> Result<NormalizeReport, NormalizeError> {
    let protocol: ProtocolId = protocol.parse()?;
    Ok(normalize(protocol, network, market, raw))
}

/// Normalize a batch, stamping every record with `now`.
///
/// Malformed assets are skipped, logged, and listed in `skipped`; the rest of
/// the batch is unaffected.
pub fn normalize_at(
    protocol: ProtocolId,
    network: &str,
    market: Option<&str>,
    raw: &[RawAsset],
    now: DateTime<Utc>,
) -> NormalizeReport {
    let decode = protocol.decoder();
    let mut report = NormalizeReport::default();

    for (index, asset) in raw.iter().enumerate() {
        let result = decode(asset).and_then(|decoded| {
            let anomalies = decoded.anomalies.clone();
            assemble(protocol, network, market, decoded, now).map(|(record, spread)| {
                (record, spread, anomalies)
            })
        });

        match result {
            Ok((record, spread, mut anomalies)) => {
                if spread < 0.0 {
                    anomalies.push(AnomalyKind::NegativeSpread {
                        spread_percent: record.spread_percent,
                    });
                }
                for kind in anomalies {
                    warn!(
                        protocol = %protocol,
                        network,
                        symbol = %record.symbol,
                        "possible protocol anomaly: {kind:?}"
                    );
                    report.anomalies.push(Anomaly {
                        index,
                        symbol: record.symbol.clone(),
                        kind,
                    });
                }
                report.records.push(record);
            }
            Err(error) => {
                let label = asset.label();
                warn!(
                    protocol = %protocol,
                    network,
                    index,
                    asset = label.as_deref().unwrap_or("?"),
                    "skipping asset: {error}"
                );
                report.skipped.push(SkippedAsset { index, label, error });
            }
        }
    }

    debug!(
        protocol = %protocol,
        network,
        records = report.records.len(),
        skipped = report.skipped.len(),
        "normalized batch"
    );
    report
}

// ── Derivation ───────────────────────────────────────────────────────

/// Derive TVL, utilization, APYs and spread, then round for presentation.
/// Returns the record and the unrounded spread.
fn assemble(
    protocol: ProtocolId,
    network: &str,
    market: Option<&str>,
    d: DecodedAsset,
    now: DateTime<Utc>,
) -> Result<(AssetMetricRecord, f64), DecodeError> {
    let tvl = d
        .reported_tvl
        .unwrap_or_else(|| math::tvl(d.total_variable_debt, d.available_liquidity));
    let utilization = if tvl > 0.0 {
        d.reported_utilization
            .unwrap_or_else(|| math::utilization(d.total_variable_debt, tvl))
            .clamp(0.0, 1.0)
    } else {
        0.0
    };

    let lending_apy = math::apr_to_apy(d.lending_apr) * 100.0;
    let variable_borrow_apy = math::apr_to_apy(d.variable_borrow_apr) * 100.0;
    let spread = variable_borrow_apy - lending_apy;

    for (field, value) in [
        ("tvl", tvl),
        ("utilization_rate", utilization),
        ("lending_apy", lending_apy),
        ("variable_borrow_apy", variable_borrow_apy),
        ("spread", spread),
        ("ltv", d.ltv_percent),
        ("liquidation_threshold", d.liquidation_threshold_percent),
    ] {
        if !value.is_finite() {
            return Err(DecodeError::OutOfRange {
                field,
                reason: format!("derived value is {value}"),
            });
        }
    }

    let record = AssetMetricRecord {
        protocol,
        network: network.to_string(),
        market: market.map(str::to_string),
        asset_address: d.address,
        asset_name: d.name,
        symbol: d.symbol,
        decimals: d.decimals,
        ltv_percent: math::round2(d.ltv_percent),
        liquidation_threshold_percent: math::round2(d.liquidation_threshold_percent),
        liquidation_bonus: d.liquidation_bonus,
        tvl: math::round2(tvl),
        total_variable_debt: math::round2(d.total_variable_debt),
        utilization_rate_percent: math::round2(utilization * 100.0),
        lending_apy_percent: math::round2(lending_apy),
        variable_borrow_apy_percent: math::round2(variable_borrow_apy),
        spread_percent: math::round2(spread),
        borrow_cap: d.borrow_cap,
        supply_cap: d.supply_cap,
        load_datetime: now,
    };

    Ok((record, spread))
}
