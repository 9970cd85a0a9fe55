use std::future::Future;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::network::TransactionBuilder;
use alloy::primitives::U256;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::abi::AbiResolver;
use crate::config::Settings;
use crate::http;
use crate::model::{RawAsset, RawField};
use crate::normalize::schema::comet;

use super::{ChainGateway, RawReserveBatch, convert, deployments};

// ── Compound v3 read interfaces ──────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IComet {
        function baseToken() external view returns (address);
        function totalSupply() external view returns (uint256);
        function totalBorrow() external view returns (uint256);
        function getUtilization() external view returns (uint256);
        function getSupplyRate(uint256 utilization) external view returns (uint64);
        function getBorrowRate(uint256 utilization) external view returns (uint64);
        function getReserves() external view returns (int256);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IERC20Metadata {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function name() external view returns (string);
    }
}

const MAX_RETRIES: u32 = 3;

/// Live gateway over JSON-RPC. A provider is built per fetch.
pub struct RpcGateway {
    settings: Settings,
    resolver: AbiResolver,
}

impl RpcGateway {
    pub fn new(settings: Settings, resolver: AbiResolver) -> Self {
        RpcGateway { settings, resolver }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(RpcGateway::new(settings.clone(), AbiResolver::new(settings)?))
    }

    /// One RPC round trip, bounded by the HTTP timeout and retried.
    async fn call<T, F, Fut>(&self, what: &str, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let limit = self.settings.http_timeout;
        http::retry(MAX_RETRIES, || http::with_timeout(limit, what, f())).await
    }
}

fn connect(rpc_url: &str) -> Result<impl Provider + Clone> {
    Ok(ProviderBuilder::new().connect_http(
        rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL: {rpc_url}"))?,
    ))
}

#[async_trait]
impl ChainGateway for RpcGateway {
    async fn fetch_reserve_data(
        &self,
        network: &str,
        market: Option<&str>,
    ) -> Result<RawReserveBatch> {
        let net = self.settings.network(network)?;
        let dep = deployments::aave(&net.name, market)?;
        let ui_provider = self
            .settings
            .aave_data_provider
            .unwrap_or(dep.ui_pool_data_provider);

        let abi = match &self.settings.aave_abi_path {
            Some(path) => {
                self.resolver
                    .contract_abi(net.chain_id, ui_provider, Some(path))
                    .await?
            }
            None => {
                self.resolver
                    .resolve_abi(net.chain_id, ui_provider, &self.resolver.cache_path(ui_provider))
                    .await?
            }
        };
        let func = abi
            .function("getReservesData")
            .and_then(|overloads| overloads.first())
            .with_context(|| format!("ABI for {ui_provider} has no getReservesData"))?;
        let input = func
            .abi_encode_input(&[DynSolValue::Address(dep.pool_addresses_provider)])
            .context("encoding getReservesData")?;

        let provider = connect(&net.rpc_url)?;
        let tx = TransactionRequest::default()
            .with_to(ui_provider)
            .with_input(input);
        let (provider, tx) = (&provider, &tx);
        let output = self
            .call("getReservesData", || async move {
                provider
                    .call(tx.clone())
                    .await
                    .context("eth_call getReservesData")
            })
            .await?;
        debug!(bytes = output.len(), "getReservesData returned");

        let values = func
            .abi_decode_output(&output)
            .context("decoding getReservesData output")?;
        let assets = convert::reserves_from_outputs(values)?;
        info!(
            network = %net.name,
            market = dep.market,
            reserves = assets.len(),
            "fetched Aave reserve data"
        );

        Ok(RawReserveBatch {
            network: net.name,
            market: Some(dep.market.to_string()),
            assets,
        })
    }

    async fn fetch_market_data(
        &self,
        network: &str,
        market: Option<&str>,
    ) -> Result<RawReserveBatch> {
        let net = self.settings.network(network)?;
        let dep = deployments::comet(&net.name, market)?;
        let provider = connect(&net.rpc_url)?;
        let contract = IComet::new(dep.comet, &provider);
        let c = &contract;

        let base = self
            .call("baseToken", || async move { c.baseToken().call().await.context("baseToken") })
            .await?;
        let total_supply = self
            .call("totalSupply", || async move {
                c.totalSupply().call().await.context("totalSupply")
            })
            .await?;
        let total_borrow = self
            .call("totalBorrow", || async move {
                c.totalBorrow().call().await.context("totalBorrow")
            })
            .await?;
        let utilization = self
            .call("getUtilization", || async move {
                c.getUtilization().call().await.context("getUtilization")
            })
            .await?;
        let supply_rate = self
            .call("getSupplyRate", || async move {
                c.getSupplyRate(utilization).call().await.context("getSupplyRate")
            })
            .await?;
        let borrow_rate = self
            .call("getBorrowRate", || async move {
                c.getBorrowRate(utilization).call().await.context("getBorrowRate")
            })
            .await?;
        let reserves = self
            .call("getReserves", || async move {
                c.getReserves().call().await.context("getReserves")
            })
            .await?;

        let token = IERC20Metadata::new(base, &provider);
        let t = &token;
        let decimals = self
            .call("decimals", || async move { t.decimals().call().await.context("decimals") })
            .await?;
        let symbol = self
            .call("symbol", || async move { t.symbol().call().await.context("symbol") })
            .await?;
        let name = self
            .call("name", || async move { t.name().call().await.context("name") })
            .await?;

        info!(
            network = %net.name,
            market = dep.market,
            %symbol,
            "fetched Compound market data"
        );

        let asset: RawAsset = [
            (comet::ASSET_ADDRESS, RawField::from(base)),
            (comet::NAME, name.into()),
            (comet::SYMBOL, symbol.into()),
            (comet::DECIMALS, U256::from(decimals).into()),
            (comet::RESERVES, reserves.into()),
            (comet::TOTAL_SUPPLY, total_supply.into()),
            (comet::TOTAL_BORROW, total_borrow.into()),
            (comet::UTILIZATION, utilization.into()),
            (comet::SUPPLY_RATE, U256::from(supply_rate).into()),
            (comet::BORROW_RATE, U256::from(borrow_rate).into()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Ok(RawReserveBatch {
            network: net.name,
            market: Some(dep.market.to_string()),
            assets: vec![asset],
        })
    }
}
