//! TVL from the Uniswap v3 and Aave v3 subgraphs and the Curve REST API.

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info};

use crate::config::{Settings, SubgraphEndpoints};
use crate::http;
use crate::output;

// ── API response types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PoolsData {
    pools: Vec<UniswapPool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSymbol {
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniswapPool {
    pub id: String,
    pub token0: TokenSymbol,
    pub token1: TokenSymbol,
    #[serde(rename = "tvlUSD", deserialize_with = "number_or_string")]
    pub tvl_usd: f64,
    #[serde(rename = "feeTier", deserialize_with = "number_or_string")]
    pub fee_tier: f64,
}

#[derive(Debug, Deserialize)]
struct MarketsData {
    markets: Vec<AaveMarket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AaveMarket {
    pub name: String,
    #[serde(rename = "totalLiquidity", deserialize_with = "number_or_string")]
    pub total_liquidity: f64,
}

#[derive(Debug, Deserialize)]
struct CurveResponse {
    data: CurveData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurveData {
    pool_data: Vec<CurvePool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePool {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub usd_total: f64,
}

/// Subgraphs return BigDecimal fields as strings.
fn number_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Num {
        F(f64),
        S(String),
    }
    match Num::deserialize(d)? {
        Num::F(f) => Ok(f),
        Num::S(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Unwrap a GraphQL envelope, surfacing `errors` as an error.
fn graph_data<T: DeserializeOwned>(body: &str, source: &str) -> Result<T> {
    let resp: GraphResponse<T> =
        serde_json::from_str(body).with_context(|| format!("{source}: unexpected response"))?;
    if let Some(e) = resp.errors.first() {
        bail!("{source}: {}", e.message);
    }
    resp.data.with_context(|| format!("{source}: response has no data"))
}

pub fn parse_uniswap_pools(body: &str) -> Result<Vec<UniswapPool>> {
    Ok(graph_data::<PoolsData>(body, "uniswap")?.pools)
}

pub fn parse_aave_markets(body: &str) -> Result<Vec<AaveMarket>> {
    Ok(graph_data::<MarketsData>(body, "aave")?.markets)
}

pub fn parse_curve_pools(body: &str) -> Result<Vec<CurvePool>> {
    let resp: CurveResponse = serde_json::from_str(body).context("curve: unexpected response")?;
    Ok(resp.data.pool_data)
}

// ── Client ───────────────────────────────────────────────────────────

pub struct SubgraphClient {
    client: reqwest::Client,
    endpoints: SubgraphEndpoints,
}

impl SubgraphClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(SubgraphClient {
            client: http::build_client(settings.http_timeout)?,
            endpoints: settings.endpoints.clone(),
        })
    }

    async fn post_query(&self, url: &str, query: &str) -> Result<String> {
        let payload = serde_json::json!({ "query": query });
        let (client, payload) = (&self.client, &payload);
        http::retry(3, || async move {
            client
                .post(url)
                .json(payload)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
                .context("reading response body")
        })
        .await
        .with_context(|| format!("POST {url}"))
    }

    /// Top `first` Uniswap v3 pools by TVL.
    pub async fn fetch_uniswap_tvl(&self, first: u32) -> Result<Vec<UniswapPool>> {
        let query = format!(
            "{{ pools(first: {first}, orderBy: tvlUSD, orderDirection: desc) \
             {{ id token0 {{ symbol }} token1 {{ symbol }} tvlUSD feeTier }} }}"
        );
        let body = self.post_query(&self.endpoints.uniswap_v3, &query).await?;
        let pools = parse_uniswap_pools(&body)?;
        info!(count = pools.len(), "fetched Uniswap pools");
        Ok(pools)
    }

    pub async fn fetch_aave_tvl(&self) -> Result<Vec<AaveMarket>> {
        let query = "{ markets { name totalLiquidity } }";
        let body = self.post_query(&self.endpoints.aave_v3, query).await?;
        let markets = parse_aave_markets(&body)?;
        info!(count = markets.len(), "fetched Aave market liquidity");
        Ok(markets)
    }

    pub async fn fetch_curve_tvl(&self) -> Result<Vec<CurvePool>> {
        let (client, url) = (&self.client, self.endpoints.curve.as_str());
        let body = http::retry(3, || async move {
            client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
                .context("reading response body")
        })
        .await
        .with_context(|| format!("GET {url}"))?;
        let pools = parse_curve_pools(&body)?;
        info!(count = pools.len(), "fetched Curve pools");
        Ok(pools)
    }
}

// ── CLI entry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TvlSource {
    Uniswap,
    Aave,
    Curve,
    All,
}

/// One row of the `tvl` listing.
#[derive(Debug, Clone, Serialize)]
pub struct TvlRow {
    pub source: &'static str,
    pub name: String,
    pub tvl_usd: f64,
}

impl From<UniswapPool> for TvlRow {
    fn from(p: UniswapPool) -> Self {
        TvlRow {
            source: "uniswap",
            name: format!(
                "{}/{} ({}%)",
                p.token0.symbol,
                p.token1.symbol,
                p.fee_tier / 10_000.0
            ),
            tvl_usd: p.tvl_usd,
        }
    }
}

impl From<AaveMarket> for TvlRow {
    fn from(m: AaveMarket) -> Self {
        TvlRow {
            source: "aave",
            name: m.name,
            tvl_usd: m.total_liquidity,
        }
    }
}

impl From<CurvePool> for TvlRow {
    fn from(p: CurvePool) -> Self {
        TvlRow {
            source: "curve",
            name: if p.name.is_empty() { p.id } else { p.name },
            tvl_usd: p.usd_total,
        }
    }
}

/// Fetch the selected sources. A failing source is logged and skipped.
pub fn run(settings: &Settings, source: TvlSource, first: u32) -> Result<()> {
    let client = SubgraphClient::new(settings)?;
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;

    let rows = rt.block_on(async {
        let mut rows: Vec<TvlRow> = Vec::new();
        let wants = |s: TvlSource| source == s || source == TvlSource::All;

        if wants(TvlSource::Uniswap) {
            match client.fetch_uniswap_tvl(first).await {
                Ok(pools) => rows.extend(pools.into_iter().map(TvlRow::from)),
                Err(e) => error!("Error fetching Uniswap TVL: {e:#}"),
            }
        }
        if wants(TvlSource::Aave) {
            match client.fetch_aave_tvl().await {
                Ok(markets) => rows.extend(markets.into_iter().map(TvlRow::from)),
                Err(e) => error!("Error fetching Aave TVL: {e:#}"),
            }
        }
        if wants(TvlSource::Curve) {
            match client.fetch_curve_tvl().await {
                Ok(mut pools) => {
                    pools.sort_by(|a, b| b.usd_total.total_cmp(&a.usd_total));
                    pools.truncate(first as usize);
                    rows.extend(pools.into_iter().map(TvlRow::from));
                }
                Err(e) => error!("Error fetching Curve TVL: {e:#}"),
            }
        }
        rows
    });

    if rows.is_empty() {
        bail!("no TVL source returned data");
    }
    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);
    println!("{:<8} {:<width$} {:>20}", "SOURCE", "NAME", "TVL");
    for row in &rows {
        println!(
            "{:<8} {:<width$} {:>20}",
            row.source,
            row.name,
            output::format_currency(row.tvl_usd, 2)
        );
    }
    Ok(())
}
