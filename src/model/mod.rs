pub mod network;
pub mod protocol;
pub mod raw;
pub mod record;

pub use network::Network;
pub use protocol::ProtocolId;
pub use raw::{FieldKind, RawAsset, RawField};
pub use record::AssetMetricRecord;
