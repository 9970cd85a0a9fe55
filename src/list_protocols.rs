use crate::gateway::deployments;
use crate::model::{Network, ProtocolId};

/// Print supported protocols, networks and markets.
pub fn run() -> anyhow::Result<()> {
    println!("Supported Protocols");
    println!("===================");
    println!();
    for (i, protocol) in ProtocolId::ALL.iter().enumerate() {
        let markets: Vec<(&str, &str)> = match protocol {
            ProtocolId::Aave => deployments::aave_markets().collect(),
            ProtocolId::Compound => deployments::comet_markets().collect(),
        };
        println!("{}. {} (--protocol {})", i + 1, protocol.name(), protocol.key());
        for (network, market) in markets {
            println!("     - {network:<10} market: {market}");
        }
        println!();
    }

    println!("Networks");
    println!("========");
    for name in Network::KNOWN {
        if let Some(network) = Network::from_name(name) {
            println!(
                "  {:<10} chain_id {:<6} override: {}",
                network.name,
                network.chain_id,
                network.rpc_env_var()
            );
        }
    }
    Ok(())
}
