//! Contract ABI lookup: Etherscan first, local JSON files second.

use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::http;

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    #[serde(default)]
    message: String,
    /// ABI JSON (as a string) on success, an error message otherwise.
    result: String,
}

/// Parse an Etherscan `getabi` body. `Ok(None)` when the contract is not verified.
pub fn parse_etherscan_response(body: &str) -> Result<Option<JsonAbi>> {
    let resp: EtherscanResponse =
        serde_json::from_str(body).context("Etherscan response is not JSON")?;
    if resp.status != "1" {
        warn!(message = %resp.message, result = %resp.result, "Etherscan returned no ABI");
        return Ok(None);
    }
    let abi = serde_json::from_str(&resp.result).context("Etherscan ABI payload is not an ABI")?;
    Ok(Some(abi))
}

/// Read an ABI JSON file.
pub fn load_abi_from_file(path: &Path) -> Result<JsonAbi> {
    if !path.exists() {
        bail!("ABI file not found: {}", path.display());
    }
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing ABI in {}", path.display()))
}

pub struct AbiResolver {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    abi_dir: PathBuf,
}

impl AbiResolver {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(AbiResolver {
            client: http::build_client(settings.http_timeout)?,
            api_url: settings.etherscan_api_url.clone(),
            api_key: settings.etherscan_api_key.clone(),
            abi_dir: settings.abi_dir.clone(),
        })
    }

    /// Default local file for `address`: `<abi_dir>/<lowercase address>.json`.
    pub fn cache_path(&self, address: Address) -> PathBuf {
        self.abi_dir
            .join(format!("{}.json", address.to_string().to_lowercase()))
    }

    /// Verified ABI from Etherscan. `Ok(None)` when unverified or no API key is set.
    pub async fn fetch_abi_from_etherscan(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Option<JsonAbi>> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(None);
        };
        let chain_id = chain_id.to_string();
        let address = address.to_string();
        let (client, url) = (&self.client, self.api_url.as_str());
        let (chain_id, address) = (chain_id.as_str(), address.as_str());
        let body = http::retry(3, || async move {
            let resp = client
                .get(url)
                .query(&[
                    ("chainid", chain_id),
                    ("module", "contract"),
                    ("action", "getabi"),
                    ("address", address),
                    ("apikey", key),
                ])
                .send()
                .await
                .context("Etherscan request")?
                .error_for_status()
                .context("Etherscan HTTP status")?;
            resp.text().await.context("Etherscan body")
        })
        .await?;
        parse_etherscan_response(&body)
    }

    /// Etherscan if possible, otherwise `fallback`.
    pub async fn resolve_abi(
        &self,
        chain_id: u64,
        address: Address,
        fallback: &Path,
    ) -> Result<JsonAbi> {
        match self.fetch_abi_from_etherscan(chain_id, address).await {
            Ok(Some(abi)) => return Ok(abi),
            Ok(None) => {}
            Err(e) => warn!(%address, "Etherscan lookup failed, using local ABI: {e:#}"),
        }
        load_abi_from_file(fallback)
            .with_context(|| format!("no ABI for {address} from Etherscan or local file"))
    }

    /// Strict lookup: the file when a path is given, Etherscan only otherwise.
    pub async fn contract_abi(
        &self,
        chain_id: u64,
        address: Address,
        strict_path: Option<&Path>,
    ) -> Result<JsonAbi> {
        if let Some(path) = strict_path {
            let abi = load_abi_from_file(path)?;
            info!(%address, path = %path.display(), "loaded ABI from file");
            return Ok(abi);
        }
        match self.fetch_abi_from_etherscan(chain_id, address).await? {
            Some(abi) => {
                info!(%address, "fetched ABI from Etherscan");
                Ok(abi)
            }
            None => bail!("Etherscan has no verified ABI for {address}"),
        }
    }

    /// Fetch from Etherscan and write `<dir>/<file_name>.json`, overwriting.
    pub async fn save_abi_to_json(
        &self,
        chain_id: u64,
        address: Address,
        file_name: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        let Some(abi) = self.fetch_abi_from_etherscan(chain_id, address).await? else {
            bail!("Failed to fetch ABI for {address} from Etherscan");
        };
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let path = dir.join(format!("{file_name}.json"));
        if path.exists() {
            info!(path = %path.display(), "overwriting existing ABI file");
        }
        let json = serde_json::to_string_pretty(&abi)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(%address, path = %path.display(), "saved ABI");
        Ok(path)
    }
}

// ── CLI entry ────────────────────────────────────────────────────────

pub fn run_save(
    settings: &Settings,
    network: &str,
    address: &str,
    name: Option<&str>,
    dir: Option<&Path>,
) -> Result<()> {
    let network = settings.network(network)?;
    let address: Address = address
        .trim()
        .parse()
        .with_context(|| format!("not an address: {address}"))?;
    let resolver = AbiResolver::new(settings)?;
    if resolver.api_key.is_none() {
        bail!("ETHERSCAN_API_KEY is not set");
    }
    let default_name = address.to_string().to_lowercase();
    let name = name.unwrap_or(&default_name);
    let dir = dir.unwrap_or(&settings.abi_dir);

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let path = rt.block_on(tokio::time::timeout(
        Duration::from_secs(120),
        resolver.save_abi_to_json(network.chain_id, address, name, dir),
    ))
    .context("saving ABI timed out")??;
    println!("{}", path.display());
    Ok(())
}
