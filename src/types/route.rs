use serde::{Deserialize, Serialize};

use super::{ChannelId, MemberId};

/// A route for a payment through a network.
///
/// `hops` lists the members the payment passes through, starting at the
/// sender and ending at the payee; `channels[i]` is the channel carrying the
/// payment from `hops[i]` to `hops[i + 1]`. A channel never appears twice on
/// the same route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRoute {
    pub hops: Vec<MemberId>,
    pub channels: Vec<ChannelId>,
}

impl PaymentRoute {
    /// Number of channels the payment crosses.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
