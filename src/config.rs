use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result, bail};

use crate::model::Network;

pub const DEFAULT_UNISWAP_V3_API: &str =
    "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3";
pub const DEFAULT_AAVE_V3_API: &str = "https://api.thegraph.com/subgraphs/name/aave/protocol-v3";
pub const DEFAULT_CURVE_API: &str = "https://api.curve.fi/api/getPools/ethereum/main";
pub const DEFAULT_ETHERSCAN_API: &str = "https://api.etherscan.io/v2/api";

/// Endpoints for the auxiliary TVL sources.
#[derive(Debug, Clone)]
pub struct SubgraphEndpoints {
    pub uniswap_v3: String,
    pub aave_v3: String,
    pub curve: String,
}

/// Process configuration, read once from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Without a key, ABI resolution goes straight to local files.
    pub etherscan_api_key: Option<String>,
    pub etherscan_api_url: String,
    /// network name → RPC URL, overriding `Network::rpc_url`.
    pub rpc_overrides: HashMap<String, String>,
    /// Replaces the registry's UiPoolDataProvider on every network.
    pub aave_data_provider: Option<Address>,
    /// Pins the UiPoolDataProvider ABI to this file, skipping Etherscan.
    pub aave_abi_path: Option<PathBuf>,
    pub abi_dir: PathBuf,
    pub log_dir: PathBuf,
    pub http_timeout: Duration,
    pub endpoints: SubgraphEndpoints,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine; a malformed one is not.
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("loading .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key → value lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut rpc_overrides = HashMap::new();
        for name in Network::KNOWN {
            if let Some(network) = Network::from_name(name) {
                if let Some(url) = get(&network.rpc_env_var()) {
                    rpc_overrides.insert(network.name.clone(), url);
                }
            }
        }
        if let Some(url) = get("ETH_RPC_URL").or_else(|| get("ETH_INFURA_RPC_URL")) {
            rpc_overrides.insert("ethereum".to_string(), url);
        }

        let aave_data_provider = match get("AAVE_DATA_PROVIDER_ADDRESS") {
            Some(s) => Some(
                s.trim()
                    .parse::<Address>()
                    .with_context(|| format!("AAVE_DATA_PROVIDER_ADDRESS is not an address: {s}"))?,
            ),
            None => None,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(s) => {
                let secs: u64 = s
                    .trim()
                    .parse()
                    .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number: {s}"))?;
                if secs == 0 {
                    bail!("HTTP_TIMEOUT_SECS must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(30),
        };

        Ok(Settings {
            etherscan_api_key: get("ETHERSCAN_API_KEY"),
            etherscan_api_url: get("ETHERSCAN_API_URL")
                .unwrap_or_else(|| DEFAULT_ETHERSCAN_API.to_string()),
            rpc_overrides,
            aave_data_provider,
            aave_abi_path: get("AAVE_ABI_PATH").map(PathBuf::from),
            abi_dir: get("ABI_DIR").map(PathBuf::from).unwrap_or_else(|| "abi".into()),
            log_dir: get("LOG_DIR").map(PathBuf::from).unwrap_or_else(|| "logs".into()),
            http_timeout,
            endpoints: SubgraphEndpoints {
                uniswap_v3: get("UNISWAP_V3_API")
                    .unwrap_or_else(|| DEFAULT_UNISWAP_V3_API.to_string()),
                aave_v3: get("AAVE_V3_API").unwrap_or_else(|| DEFAULT_AAVE_V3_API.to_string()),
                curve: get("CURVE_API").unwrap_or_else(|| DEFAULT_CURVE_API.to_string()),
            },
        })
    }

    /// Resolve a network name, applying any RPC override.
    pub fn network(&self, name: &str) -> Result<Network> {
        let mut network = match Network::from_name(name) {
            Some(n) => n,
            None => bail!(
                "Unknown network '{name}'. Known networks: {}",
                Network::KNOWN.join(", ")
            ),
        };
        if let Some(url) = self.rpc_overrides.get(&network.name) {
            network.rpc_url = url.clone();
        }
        Ok(network)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            etherscan_api_key: None,
            etherscan_api_url: DEFAULT_ETHERSCAN_API.to_string(),
            rpc_overrides: HashMap::new(),
            aave_data_provider: None,
            aave_abi_path: None,
            abi_dir: "abi".into(),
            log_dir: "logs".into(),
            http_timeout: Duration::from_secs(30),
            endpoints: SubgraphEndpoints {
                uniswap_v3: DEFAULT_UNISWAP_V3_API.to_string(),
                aave_v3: DEFAULT_AAVE_V3_API.to_string(),
                curve: DEFAULT_CURVE_API.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert!(s.etherscan_api_key.is_none());
        assert_eq!(s.http_timeout, Duration::from_secs(30));
        assert_eq!(s.abi_dir, PathBuf::from("abi"));
        assert!(s.aave_abi_path.is_none());
        assert_eq!(s.endpoints.curve, DEFAULT_CURVE_API);
        assert_eq!(s.network("ethereum").unwrap().rpc_url, "https://eth.llamarpc.com");
    }

    #[test]
    fn infura_alias_overrides_ethereum_rpc() {
        let s = Settings::from_lookup(lookup(&[
            ("ETH_INFURA_RPC_URL", "https://mainnet.infura.io/v3/key"),
            ("BASE_RPC_URL", "https://base.example"),
            ("ETHERSCAN_API_KEY", "abc"),
            ("ABI_DIR", "/tmp/abis"),
        ]))
        .unwrap();
        assert_eq!(s.network("mainnet").unwrap().rpc_url, "https://mainnet.infura.io/v3/key");
        assert_eq!(s.network("base").unwrap().rpc_url, "https://base.example");
        assert_eq!(s.etherscan_api_key.as_deref(), Some("abc"));
        assert_eq!(s.abi_dir, PathBuf::from("/tmp/abis"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let s = Settings::from_lookup(lookup(&[("ETHERSCAN_API_KEY", "  "), ("AAVE_ABI_PATH", "")]))
            .unwrap();
        assert!(s.etherscan_api_key.is_none());
        assert!(s.aave_abi_path.is_none());
    }

    #[test]
    fn aave_abi_path_is_read() {
        let s = Settings::from_lookup(lookup(&[("AAVE_ABI_PATH", "abi/ui_pool.json")])).unwrap();
        assert_eq!(s.aave_abi_path, Some(PathBuf::from("abi/ui_pool.json")));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(Settings::from_lookup(lookup(&[("AAVE_DATA_PROVIDER_ADDRESS", "0x123")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn unknown_network_lists_known_ones() {
        let err = Settings::default().network("solana").unwrap_err();
        assert!(err.to_string().contains("ethereum"));
    }
}
