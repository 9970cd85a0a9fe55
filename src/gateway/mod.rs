//! Reads raw reserve state from chain.
//!
//! The gateway stops at `RawAsset`: it knows how to call each protocol's
//! contracts but nothing about how their numbers are scaled. That is the
//! normalizer's job.

pub mod convert;
pub mod deployments;
mod rpc;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{ProtocolId, RawAsset};

pub use rpc::RpcGateway;

/// One protocol/network/market read, still in protocol-native shape.
#[derive(Debug, Clone, Default)]
pub struct RawReserveBatch {
    pub network: String,
    pub market: Option<String>,
    pub assets: Vec<RawAsset>,
}

/// Source of raw reserve data. `RpcGateway` is the live implementation.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Aave: every reserve of the pool behind `market` (default market when `None`).
    async fn fetch_reserve_data(&self, network: &str, market: Option<&str>)
    -> Result<RawReserveBatch>;

    /// Compound v3: the base-asset record of one Comet market.
    async fn fetch_market_data(&self, network: &str, market: Option<&str>)
    -> Result<RawReserveBatch>;

    /// Dispatch on protocol.
    async fn fetch(
        &self,
        protocol: ProtocolId,
        network: &str,
        market: Option<&str>,
    ) -> Result<RawReserveBatch> {
        match protocol {
            ProtocolId::Aave => self.fetch_reserve_data(network, market).await,
            ProtocolId::Compound => self.fetch_market_data(network, market).await,
        }
    }
}
