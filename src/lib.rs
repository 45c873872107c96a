pub mod types;
pub mod channel;
pub mod network;
pub mod generator;
pub mod workload;
pub mod utils;

pub use types::{ChannelId, MemberId, PaymentRoute};
pub use channel::HyperChannel;
pub use network::HyperNetwork;
pub use generator::{NetworkPair, NetworkPairBuilder};
pub use workload::{Payment, Workload, WorkloadBuilder};
