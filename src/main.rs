use clap::Parser;

use defi_liquidity_tracker::{
    abi, cli, config::Settings, list_protocols, logging, snapshot, subgraph,
};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let settings = Settings::from_env()?;
    logging::init(&settings.log_dir, &cli.log_level)?;

    match cli.command {
        cli::Command::Snapshot {
            protocol,
            network,
            market,
            format,
            output,
        } => snapshot::run(&settings, &snapshot::SnapshotConfig {
            protocol,
            networks: network,
            market,
            format,
            output,
        }),
        cli::Command::Protocols => list_protocols::run(),
        cli::Command::SaveAbi {
            address,
            name,
            dir,
            network,
        } => abi::run_save(&settings, &network, &address, name.as_deref(), dir.as_deref()),
        cli::Command::Tvl { source, first } => subgraph::run(&settings, source, first),
    }
}
