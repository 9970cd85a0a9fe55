pub mod abi;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod http;
pub mod list_protocols;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod output;
pub mod snapshot;
pub mod subgraph;
