use serde::{Deserialize, Serialize};

/// An EVM network the tracker can read from.
///
/// `rpc_url` is a public default; `Settings` may override it per network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    /// Lowercase network name (e.g. "ethereum", "base").
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
}

// ── Known networks ───────────────────────────────────────────────────

impl Network {
    pub const KNOWN: [&'static str; 5] = ["ethereum", "arbitrum", "optimism", "base", "polygon"];

    pub fn ethereum() -> Self {
        Network::custom("ethereum", 1, "https://eth.llamarpc.com")
    }
    pub fn arbitrum() -> Self {
        Network::custom("arbitrum", 42161, "https://arb1.arbitrum.io/rpc")
    }
    pub fn optimism() -> Self {
        Network::custom("optimism", 10, "https://mainnet.optimism.io")
    }
    pub fn base() -> Self {
        Network::custom("base", 8453, "https://mainnet.base.org")
    }
    pub fn polygon() -> Self {
        Network::custom("polygon", 137, "https://polygon-rpc.com")
    }

    /// Look up a known network by name. "mainnet" and "eth" map to ethereum.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ethereum" | "mainnet" | "eth" => Some(Self::ethereum()),
            "arbitrum" | "arbitrum-one" => Some(Self::arbitrum()),
            "optimism" | "op" => Some(Self::optimism()),
            "base" => Some(Self::base()),
            "polygon" | "matic" => Some(Self::polygon()),
            _ => None,
        }
    }

    /// Custom EVM network with chain_id + rpc_url.
    pub fn custom(name: impl Into<String>, chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Network {
            name: name.into(),
            chain_id,
            rpc_url: rpc_url.into(),
        }
    }

    /// Environment variable that overrides this network's RPC URL.
    pub fn rpc_env_var(&self) -> String {
        format!("{}_RPC_URL", self.name.to_uppercase())
    }
}

// ── Display ──────────────────────────────────────────────────────────

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_known_networks() {
        assert_eq!(Network::from_name("Mainnet").unwrap().chain_id, 1);
        assert_eq!(Network::from_name("base").unwrap().chain_id, 8453);
        assert!(Network::from_name("solana").is_none());
        for name in Network::KNOWN {
            assert_eq!(Network::from_name(name).unwrap().name, name);
        }
    }

    #[test]
    fn rpc_env_var_is_uppercased() {
        assert_eq!(Network::arbitrum().rpc_env_var(), "ARBITRUM_RPC_URL");
    }
}
