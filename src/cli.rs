use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use crate::subgraph::TvlSource;

/// DeFi lending-market tracker: snapshot Aave and Compound reserves into
/// uniform TVL, utilization and APY records.
#[derive(Parser)]
#[command(name = "defi-liquidity-tracker", version, about)]
pub struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch and normalize reserve metrics for one protocol
    Snapshot {
        /// Protocol: aave or compound
        #[arg(long, short = 'p')]
        protocol: String,

        /// Network(s) to read, repeatable
        #[arg(long, short = 'n', default_value = "ethereum")]
        network: Vec<String>,

        /// Market within the protocol (e.g. "core", "lido", "usdc")
        #[arg(long)]
        market: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List supported protocols, networks and markets
    Protocols,

    /// Download a verified contract ABI from Etherscan into a JSON file
    SaveAbi {
        /// Contract address
        address: String,

        /// File name without .json (default: the lowercase address)
        name: Option<String>,

        /// Directory to write into (default: ABI_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Network the contract lives on
        #[arg(long, default_value = "ethereum")]
        network: String,
    },

    /// Show TVL from the Uniswap, Aave and Curve public APIs
    Tvl {
        #[arg(long, value_enum, default_value_t = TvlSource::All)]
        source: TvlSource,

        /// Number of pools per source
        #[arg(long, default_value = "5")]
        first: u32,
    },
}
