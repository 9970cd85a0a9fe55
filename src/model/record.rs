use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::protocol::ProtocolId;

/// Uniform, display-ready metrics for one lending-market asset.
///
/// Percentages and amounts are rounded to 2 decimals. Caps and the
/// liquidation bonus are carried as the protocol reports them. Column names
/// are the public output contract and must stay stable across protocols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetricRecord {
    pub protocol: ProtocolId,
    pub network: String,
    pub market: Option<String>,
    pub asset_address: String,
    pub asset_name: String,
    pub symbol: String,
    pub decimals: u8,
    pub ltv_percent: f64,
    pub liquidation_threshold_percent: f64,
    pub liquidation_bonus: u64,
    /// Total value locked, in the asset's raw base units.
    pub tvl: f64,
    /// Outstanding variable debt, in the asset's raw base units.
    pub total_variable_debt: f64,
    pub utilization_rate_percent: f64,
    pub lending_apy_percent: f64,
    pub variable_borrow_apy_percent: f64,
    pub spread_percent: f64,
    pub borrow_cap: u64,
    pub supply_cap: u64,
    /// Fetch-time wall clock, not block time.
    #[serde(with = "load_datetime_format")]
    pub load_datetime: DateTime<Utc>,
}

impl AssetMetricRecord {
    /// Equality on every field except `load_datetime`.
    pub fn same_metrics(&self, other: &Self) -> bool {
        let mut a = self.clone();
        a.load_datetime = other.load_datetime;
        a == *other
    }
}

/// `load_datetime` as `YYYY-MM-DD HH:MM:SS` (UTC), so CSV and JSON agree.
pub mod load_datetime_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|ndt| ndt.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
