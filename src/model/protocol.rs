use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizeError;

/// Lending protocol families the normalizer knows how to decode.
///
/// The set is closed: adding a protocol means adding a variant here and a
/// decode function in `normalize`, and the compiler points at every match
/// that needs updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolId {
    /// Aave v3 reserves, positional tuples from `UiPoolDataProvider.getReservesData`.
    Aave,
    /// Compound v3 (Comet) markets, named fields read one call at a time.
    Compound,
}

impl ProtocolId {
    pub const ALL: [ProtocolId; 2] = [ProtocolId::Aave, ProtocolId::Compound];

    /// Display name used in output records.
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolId::Aave => "Aave",
            ProtocolId::Compound => "Compound",
        }
    }

    /// Lowercase CLI / config key.
    pub fn key(&self) -> &'static str {
        match self {
            ProtocolId::Aave => "aave",
            ProtocolId::Compound => "compound",
        }
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProtocolId {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aave" | "aave-v3" | "aave_v3" | "aavev3" => Ok(ProtocolId::Aave),
            "compound" | "compound-v3" | "compound_v3" | "comet" => Ok(ProtocolId::Compound),
            _ => Err(NormalizeError::UnsupportedProtocol(s.to_string())),
        }
    }
}
