use alloy::primitives::Address;
use anyhow::{Context, Result, bail};

/// Aave v3 contracts for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AaveDeployment {
    pub network: &'static str,
    pub market: &'static str,
    pub ui_pool_data_provider: Address,
    pub pool_addresses_provider: Address,
}

/// One Compound v3 (Comet) market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CometDeployment {
    pub network: &'static str,
    pub market: &'static str,
    pub comet: Address,
}

// ── Registry ─────────────────────────────────────────────────────────

// (network, market, UiPoolDataProvider, PoolAddressesProvider)
const AAVE_V3: &[(&str, &str, &str, &str)] = &[
    // ── Ethereum ──
    (
        "ethereum",
        "core",
        "0x3F78BBD206e4D3c504Eb854232EdA7e47E9Fd8FC",
        "0x2f39d218133AFaB8F2B819B1066c7E434Ad94E9e",
    ),
    (
        "ethereum",
        "lido",
        "0x3F78BBD206e4D3c504Eb854232EdA7e47E9Fd8FC",
        "0xcfBf336fe147D643B9Cb705648500e101504B16d",
    ),
    // ── Arbitrum ──
    (
        "arbitrum",
        "core",
        "0x5c5228aC8BC1528482514aF3e27E692495148717",
        "0xa97684ead0e402dC232d5A977953DF7ECBaB3CDb",
    ),
    // ── Base ──
    (
        "base",
        "core",
        "0x68100bD5345eA474D93577127C11F39FF8463e93",
        "0xe20fCBdBfFC4Dd138cE8b2E6FBb6CB49777ad64D",
    ),
];

// (network, market, Comet proxy). First entry per network is the default.
const COMET: &[(&str, &str, &str)] = &[
    ("ethereum", "usdc", "0xc3d688B66703497DAA19211EEdff47f25384cdc3"),
    ("ethereum", "weth", "0xA17581A9E3356d9A858b789D68B4d866e593aE94"),
    ("ethereum", "usdt", "0x3Afdc9BCA9213A35503b077a6072F3D0d5AB0840"),
    ("base", "usdc", "0xb125E6687d4313864e53df431d5425969c15Eb2F"),
    ("arbitrum", "usdc", "0x9c4ec768c28520B50860ea7a15bd7213a9fF58bf"),
];

const DEFAULT_AAVE_MARKET: &str = "core";

// ── Lookup ───────────────────────────────────────────────────────────

fn parse(label: &str, s: &str) -> Result<Address> {
    s.parse()
        .with_context(|| format!("registry address for {label} is invalid: {s}"))
}

/// Aave deployment for `network`, defaulting to the core market.
pub fn aave(network: &str, market: Option<&str>) -> Result<AaveDeployment> {
    let market = market.unwrap_or(DEFAULT_AAVE_MARKET).to_lowercase();
    let Some(&(net, mkt, ui, pap)) = AAVE_V3
        .iter()
        .find(|(n, m, _, _)| *n == network && *m == market)
    else {
        bail!(
            "No Aave v3 deployment for {network}/{market}. Known: {}",
            known(AAVE_V3.iter().map(|(n, m, _, _)| (*n, *m)))
        );
    };
    let label = format!("{net}/{mkt}");
    Ok(AaveDeployment {
        network: net,
        market: mkt,
        ui_pool_data_provider: parse(&label, ui)?,
        pool_addresses_provider: parse(&label, pap)?,
    })
}

/// Comet deployment for `network`; without a market, the first listed for it.
pub fn comet(network: &str, market: Option<&str>) -> Result<CometDeployment> {
    let market = market.map(str::to_lowercase);
    let found = COMET.iter().find(|(n, m, _)| {
        *n == network && market.as_deref().is_none_or(|want| *m == want)
    });
    let Some(&(net, mkt, addr)) = found else {
        bail!(
            "No Compound v3 market for {network}/{}. Known: {}",
            market.as_deref().unwrap_or("*"),
            known(COMET.iter().map(|(n, m, _)| (*n, *m)))
        );
    };
    Ok(CometDeployment {
        network: net,
        market: mkt,
        comet: parse(&format!("{net}/{mkt}"), addr)?,
    })
}

/// Every (network, market) pair known for Aave and Compound, for listings.
pub fn aave_markets() -> impl Iterator<Item = (&'static str, &'static str)> {
    AAVE_V3.iter().map(|(n, m, _, _)| (*n, *m))
}

pub fn comet_markets() -> impl Iterator<Item = (&'static str, &'static str)> {
    COMET.iter().map(|(n, m, _)| (*n, *m))
}

fn known<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(n, m)| format!("{n}/{m}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registry_address_parses() {
        for (n, m) in aave_markets() {
            aave(n, Some(m)).unwrap();
        }
        for (n, m) in comet_markets() {
            comet(n, Some(m)).unwrap();
        }
    }

    #[test]
    fn defaults_pick_the_first_market() {
        assert_eq!(aave("ethereum", None).unwrap().market, "core");
        assert_eq!(comet("ethereum", None).unwrap().market, "usdc");
        assert_eq!(comet("base", Some("USDC")).unwrap().network, "base");
    }

    #[test]
    fn unknown_market_lists_known_ones() {
        let err = aave("polygon", None).unwrap_err().to_string();
        assert!(err.contains("ethereum/core"), "{err}");
        assert!(comet("ethereum", Some("dai")).is_err());
    }
}
