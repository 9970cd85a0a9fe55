//! Fetch, normalize, emit.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::gateway::{ChainGateway, RpcGateway};
use crate::model::ProtocolId;
use crate::normalize::{self, NormalizeReport};
use crate::output::{self, OutputFormat};

pub struct SnapshotConfig {
    pub protocol: String,
    pub networks: Vec<String>,
    pub market: Option<String>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// Fetch one protocol/network/market and normalize it.
pub async fn snapshot(
    gateway: &dyn ChainGateway,
    protocol: ProtocolId,
    network: &str,
    market: Option<&str>,
) -> Result<NormalizeReport> {
    let batch = gateway.fetch(protocol, network, market).await?;
    Ok(normalize::normalize(
        protocol,
        &batch.network,
        batch.market.as_deref(),
        &batch.assets,
    ))
}

/// Snapshot several networks concurrently. Results come back in `networks` order.
pub async fn snapshot_networks(
    gateway: Arc<dyn ChainGateway>,
    protocol: ProtocolId,
    networks: &[String],
    market: Option<&str>,
) -> Vec<(String, Result<NormalizeReport>)> {
    let mut set = JoinSet::new();
    for (i, network) in networks.iter().enumerate() {
        let gateway = Arc::clone(&gateway);
        let network = network.clone();
        let market = market.map(str::to_string);
        set.spawn(async move {
            let result = snapshot(gateway.as_ref(), protocol, &network, market.as_deref()).await;
            (i, result)
        });
    }

    let mut slots: Vec<Option<Result<NormalizeReport>>> = networks.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((i, result)) => slots[i] = Some(result),
            Err(e) => error!("snapshot task failed: {e}"),
        }
    }
    networks
        .iter()
        .zip(slots)
        .map(|(network, slot)| {
            let result = slot
                .unwrap_or_else(|| Err(anyhow!("snapshot task for {network} did not complete")));
            (network.clone(), result)
        })
        .collect()
}

// ── CLI entry ────────────────────────────────────────────────────────

pub fn run(settings: &Settings, config: &SnapshotConfig) -> Result<()> {
    let protocol: ProtocolId = config.protocol.parse()?;
    if config.networks.is_empty() {
        bail!("at least one --network is required");
    }
    for network in &config.networks {
        settings.network(network)?;
    }

    let gateway: Arc<dyn ChainGateway> = Arc::new(RpcGateway::from_settings(settings)?);
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let results = rt.block_on(snapshot_networks(
        gateway,
        protocol,
        &config.networks,
        config.market.as_deref(),
    ));

    let mut records = Vec::new();
    let mut failed = 0;
    for (network, result) in results {
        match result {
            Ok(report) => {
                if !report.is_complete() {
                    warn!(
                        %network,
                        skipped = report.skipped.len(),
                        "some assets could not be decoded"
                    );
                }
                info!(%network, records = report.records.len(), "snapshot complete");
                records.extend(report.records);
            }
            Err(e) => {
                failed += 1;
                error!(%network, "snapshot failed: {e:#}");
            }
        }
    }
    if failed == config.networks.len() {
        bail!("snapshot failed on every network");
    }

    output::emit(&records, config.format, config.output.as_deref())
}
