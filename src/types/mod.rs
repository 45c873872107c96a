use serde::{Deserialize, Serialize};
use std::fmt;

pub mod constants;
pub mod route;

pub use route::PaymentRoute;

/// A unique identifier for a network member.
///
/// The same id used in two networks denotes the same logical participant;
/// per-network membership state (incident channels, fee intake) lives in the
/// owning [`HyperNetwork`](crate::network::HyperNetwork).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MemberId(pub usize);

/// A unique identifier for a channel within its owning network.
///
/// Channel ids are arena indices: they are assigned in channel insertion
/// order and are only meaningful relative to the network that created them.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChannelId(pub usize);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}
