use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Shared HTTP client settings for the ABI, subgraph and REST fetchers.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("defi-liquidity-tracker/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("creating HTTP client")
}

/// Retry an async operation with exponential backoff (1s, 2s, 4s, ...).
pub async fn retry<T, F, Fut>(max_retries: u32, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..=max_retries {
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                debug!(attempt, "request failed: {e:#}");
                last_err = Some(e);
                if attempt < max_retries {
                    let delay = Duration::from_millis(1000 * 2u64.pow(attempt));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("retry exhausted without an attempt")))
}

/// Bound a future by `limit`, turning expiry into an error naming `what`.
pub async fn with_timeout<T, Fut>(limit: Duration, what: &str, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .with_context(|| format!("{what} timed out after {}s", limit.as_secs()))?
}
