//! Seed-driven construction of a classic / hyper network pair.
//!
//! The classic network is generated scale-free by preferential attachment;
//! the hyper network is derived from it by fusing dead-end chains and
//! contracted paths into multi-party channels, keeping every member's wealth
//! identical between the two. Reusing a seed reproduces the pair bit for
//! bit.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::network::HyperNetwork;
use crate::types::{ChannelId, MemberId};
use crate::utils::logging;

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Errors
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("network must have at least two members, got {0}")]
    TooFewMembers(usize),
    #[error("number of classic channels ({channels}) must be at least the number of members minus one ({minimum})")]
    TooFewChannels { channels: usize, minimum: usize },
    #[error("funding contribution bounds are invalid: min {min}, max {max}")]
    InvalidFundingBounds { min: i64, max: i64 },
    #[error("maximum hyper-channel size must be at least 2, got {0}")]
    ChannelSizeTooSmall(usize),
}

// ------------------------------------------------------------------------------------------------
// Builder
// ------------------------------------------------------------------------------------------------

/// Configures and produces a [`NetworkPair`].
///
/// All parameters may be adjusted until [`generate`](Self::generate) is
/// called; `generate` consumes the builder, so the configuration of a built
/// pair can no longer change.
#[derive(Debug, Clone)]
pub struct NetworkPairBuilder {
    seed: u64,
    funding_contribution_min: i64,
    funding_contribution_max: i64,
    num_members: usize,
    num_classic_channels: Option<usize>,
    max_hyper_channel_size: usize,
    hpc_avoidance_min_connectivity: usize,
    hpc_parsimony: bool,
}

impl NetworkPairBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            funding_contribution_min: 10_000_000,
            funding_contribution_max: 10_000_000_000,
            num_members: 1_000,
            num_classic_channels: None,
            max_hyper_channel_size: 30,
            hpc_avoidance_min_connectivity: 5,
            hpc_parsimony: false,
        }
    }

    /// Lower bound of the log-uniform deposit distribution.
    pub fn funding_contribution_min(mut self, funding_contribution_min: i64) -> Self {
        self.funding_contribution_min = funding_contribution_min;
        self
    }

    /// Upper bound of the log-uniform deposit distribution.
    pub fn funding_contribution_max(mut self, funding_contribution_max: i64) -> Self {
        self.funding_contribution_max = funding_contribution_max;
        self
    }

    pub fn num_members(mut self, num_members: usize) -> Self {
        self.num_members = num_members;
        self
    }

    /// Number of channels in the classic network. Defaults to 1.2 times the
    /// number of members, rounded down.
    pub fn num_classic_channels(mut self, num_classic_channels: usize) -> Self {
        self.num_classic_channels = Some(num_classic_channels);
        self
    }

    /// Hard cap on the number of members of a hyper channel.
    pub fn max_hyper_channel_size(mut self, max_hyper_channel_size: usize) -> Self {
        self.max_hyper_channel_size = max_hyper_channel_size;
        self
    }

    /// Classic channels whose endpoints both have at least this many
    /// incident channels are not contracted into hyper channels.
    pub fn hpc_avoidance_min_connectivity(mut self, hpc_avoidance_min_connectivity: usize) -> Self {
        self.hpc_avoidance_min_connectivity = hpc_avoidance_min_connectivity;
        self
    }

    /// When set, keeps the number of hyper channels low by skipping path
    /// contraction.
    pub fn hpc_parsimony(mut self, hpc_parsimony: bool) -> Self {
        self.hpc_parsimony = hpc_parsimony;
        self
    }

    /// Validates the configuration and produces the (not yet initialized)
    /// pair.
    pub fn generate(self) -> Result<NetworkPair, ConfigError> {
        let num_classic_channels = self
            .num_classic_channels
            .unwrap_or((self.num_members as f64 * 1.2) as usize);

        if self.num_members < 2 {
            return Err(ConfigError::TooFewMembers(self.num_members));
        }
        if num_classic_channels < self.num_members - 1 {
            return Err(ConfigError::TooFewChannels {
                channels: num_classic_channels,
                minimum: self.num_members - 1,
            });
        }
        if self.funding_contribution_min <= 0
            || self.funding_contribution_min > self.funding_contribution_max
        {
            return Err(ConfigError::InvalidFundingBounds {
                min: self.funding_contribution_min,
                max: self.funding_contribution_max,
            });
        }
        if self.max_hyper_channel_size < 2 {
            return Err(ConfigError::ChannelSizeTooSmall(self.max_hyper_channel_size));
        }

        Ok(NetworkPair {
            seed: self.seed,
            rng: StdRng::seed_from_u64(self.seed),
            funding_contribution_max: self.funding_contribution_max,
            funding_exponent_range: (self.funding_contribution_min as f64
                / self.funding_contribution_max as f64)
                .ln(),
            num_members: self.num_members,
            num_classic_channels,
            max_hyper_channel_size: self.max_hyper_channel_size,
            hpc_avoidance_min_connectivity: self.hpc_avoidance_min_connectivity,
            hpc_parsimony: self.hpc_parsimony,
            initialized: false,
            classic: None,
            hyper: None,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// Network Pair
// ------------------------------------------------------------------------------------------------

/// A classic network and the hyper network derived from it.
///
/// Obtained from a [`NetworkPairBuilder`]; the networks exist only after
/// [`init`](Self::init) has run.
pub struct NetworkPair {
    seed: u64,
    rng: StdRng,
    funding_contribution_max: i64,
    funding_exponent_range: f64,
    num_members: usize,
    num_classic_channels: usize,
    max_hyper_channel_size: usize,
    hpc_avoidance_min_connectivity: usize,
    hpc_parsimony: bool,
    initialized: bool,
    classic: Option<HyperNetwork>,
    hyper: Option<HyperNetwork>,
}

/// A hyper channel under construction: members in insertion order plus the
/// balance each brings along.
struct ProtoChannel {
    members: Vec<MemberId>,
    assets: HashMap<MemberId, i64>,
}

impl ProtoChannel {
    fn new() -> Self {
        Self { members: Vec::new(), assets: HashMap::new() }
    }

    fn push(&mut self, member: MemberId, asset: i64) {
        self.members.push(member);
        self.assets.insert(member, asset);
    }

    fn add_asset(&mut self, member: MemberId, asset: i64) {
        *self.assets.entry(member).or_insert(0) += asset;
    }

    fn deposits(&self) -> Vec<i64> {
        self.members.iter().map(|member| self.assets[member]).collect()
    }
}

impl NetworkPair {
    /// Constructs both networks. May only be called once; a second call is a
    /// programmer error.
    pub fn init(&mut self) {
        if self.initialized {
            panic!("a NetworkPair may only be initialized once");
        }

        logging::log("GENERATOR", &format!("constructing classic network from seed {}", self.seed));
        self.construct_classic_network();
        logging::log("GENERATOR", "deriving hyper network");
        self.construct_hyper_network();

        self.initialized = true;
    }

    /// The generated classic network. Panics if the pair has not been
    /// initialized.
    pub fn classic_network(&self) -> &HyperNetwork {
        assert!(self.initialized, "classic_network() requires an initialized NetworkPair");
        self.classic.as_ref().expect("initialized pair has a classic network")
    }

    /// The generated hyper network. Panics if the pair has not been
    /// initialized.
    pub fn hyper_network(&self) -> &HyperNetwork {
        assert!(self.initialized, "hyper_network() requires an initialized NetworkPair");
        self.hyper.as_ref().expect("initialized pair has a hyper network")
    }

    pub fn classic_network_mut(&mut self) -> &mut HyperNetwork {
        assert!(self.initialized, "classic_network_mut() requires an initialized NetworkPair");
        self.classic.as_mut().expect("initialized pair has a classic network")
    }

    pub fn hyper_network_mut(&mut self) -> &mut HyperNetwork {
        assert!(self.initialized, "hyper_network_mut() requires an initialized NetworkPair");
        self.hyper.as_mut().expect("initialized pair has a hyper network")
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A deposit drawn log-uniformly between the funding contribution
    /// bounds: `max` at an exponent of zero, `min` at the full exponent
    /// range.
    fn sample_funding_contribution(&mut self) -> i64 {
        let exponent = self.rng.gen::<f64>() * self.funding_exponent_range;
        (self.funding_contribution_max as f64 * exponent.exp()) as i64
    }

    // --------------------------------------------------------------------------------------------
    // Classic Construction
    // --------------------------------------------------------------------------------------------

    /// Builds the scale-free classic network by preferential attachment.
    ///
    /// Every channel opening appends both endpoints to the attachment list,
    /// so a member's multiplicity in it equals its degree and partners are
    /// drawn proportionally to the channels they already have.
    fn construct_classic_network(&mut self) {
        let mut network = HyperNetwork::new();

        let members: Vec<MemberId> = (0..self.num_members).map(MemberId).collect();
        for &member in &members {
            network.add_member(member);
        }

        let mut member_queue: VecDeque<MemberId> = members.iter().copied().collect();
        let mut attachments: Vec<MemberId> = Vec::new();

        let first = member_queue.pop_front().expect("at least two members");
        let second = member_queue.pop_front().expect("at least two members");
        let first_deposit = self.sample_funding_contribution();
        let second_deposit = self.sample_funding_contribution();

        network.add_channel(&[first, second], &[first_deposit, second_deposit]);
        attachments.push(first);
        attachments.push(second);

        for _ in 1..self.num_classic_channels {
            if member_queue.is_empty() {
                member_queue = members.iter().copied().collect();
            }

            let member = member_queue.pop_front().expect("queue was just refilled");
            let partner = loop {
                let candidate = attachments[self.rng.gen_range(0..attachments.len())];
                if candidate != member {
                    break candidate;
                }
            };

            let member_deposit = self.sample_funding_contribution();
            let partner_deposit = self.sample_funding_contribution();

            network.add_channel(&[member, partner], &[member_deposit, partner_deposit]);
            attachments.push(member);
            attachments.push(partner);
        }

        self.classic = Some(network);
    }

    // --------------------------------------------------------------------------------------------
    // Hyper Construction
    // --------------------------------------------------------------------------------------------

    /// Derives the hyper network from the classic one.
    ///
    /// Stage A fuses dead-end chains around their connectors, stage B
    /// contracts paths through weakly connected members (skipped under
    /// parsimony), and whatever classic channels remain are carried over
    /// unchanged. Every member ends up with the same wealth it has in the
    /// classic network.
    fn construct_hyper_network(&mut self) {
        let classic = self.classic.as_ref().expect("classic network is constructed first");

        // Classic channels not yet absorbed into a proto-channel.
        let mut working: Vec<ChannelId> = (0..classic.num_channels()).map(ChannelId).collect();

        // Stage A: group dead ends by their connector.
        let mut connectors: Vec<MemberId> = Vec::new();
        let mut dead_end_attachments: HashMap<MemberId, Vec<MemberId>> = HashMap::new();

        for &member in classic.members() {
            let incident = classic.incident_channels(member);
            if incident.len() != 1 {
                continue;
            }

            let channel_id = incident[0];
            working.retain(|&candidate| candidate != channel_id);

            let connector = classic
                .channel(channel_id)
                .members()
                .iter()
                .copied()
                .find(|&endpoint| endpoint != member)
                .expect("a classic channel has two distinct members");

            if !dead_end_attachments.contains_key(&connector) {
                connectors.push(connector);
                dead_end_attachments.insert(connector, Vec::new());
            }
            dead_end_attachments
                .get_mut(&connector)
                .expect("connector was just registered")
                .push(member);
        }

        let mut proto_channels: Vec<ProtoChannel> = Vec::new();

        for &connector in &connectors {
            let dead_ends = &dead_end_attachments[&connector];

            // Split the dead ends over as few proto-channels as the size cap
            // allows, evening out the group sizes.
            let fractions_necessary =
                div_ceil(dead_ends.len(), self.max_hyper_channel_size - 1);
            let ideal_size = 1 + div_ceil(dead_ends.len(), fractions_necessary);

            for group in dead_ends.chunks(ideal_size - 1) {
                let mut proto_channel = ProtoChannel::new();
                proto_channel.push(connector, 0);

                for &dead_end in group {
                    let channel = classic.channel(classic.incident_channels(dead_end)[0]);
                    proto_channel.push(dead_end, channel.balance_of(dead_end));
                    proto_channel.add_asset(connector, channel.balance_of(connector));
                }

                proto_channels.push(proto_channel);
            }
        }

        self.unify_proto_channels(&mut proto_channels);

        // Stage B: contract paths through members below the connectivity
        // threshold. Connectivity is measured against the full classic
        // network, not the shrinking working set.
        if !self.hpc_parsimony {
            let mut kept = Vec::with_capacity(working.len());
            for &channel_id in &working {
                let channel = classic.channel(channel_id);
                let endpoints = channel.members();
                debug_assert_eq!(endpoints.len(), 2);

                let weakly_connected = endpoints.iter().any(|&endpoint| {
                    classic.incident_channels(endpoint).len() < self.hpc_avoidance_min_connectivity
                });

                if weakly_connected {
                    let mut proto_channel = ProtoChannel::new();
                    for &endpoint in endpoints {
                        proto_channel.push(endpoint, channel.balance_of(endpoint));
                    }
                    proto_channels.push(proto_channel);
                } else {
                    kept.push(channel_id);
                }
            }
            working = kept;

            self.unify_proto_channels(&mut proto_channels);
        }

        // Carry over what is left: the channels of the well-connected
        // members, or everything but the outermost ones under parsimony.
        for &channel_id in &working {
            let channel = classic.channel(channel_id);
            let mut proto_channel = ProtoChannel::new();
            for &endpoint in channel.members() {
                proto_channel.push(endpoint, channel.balance_of(endpoint));
            }
            proto_channels.push(proto_channel);
        }

        let mut hyper = HyperNetwork::new();
        for &member in classic.members() {
            hyper.add_member(member);
        }
        for proto_channel in &proto_channels {
            hyper.add_channel(&proto_channel.members, &proto_channel.deposits());
        }

        logging::log(
            "GENERATOR",
            &format!(
                "hyper network has {} channels for {} classic ones",
                proto_channels.len(),
                classic.num_channels()
            ),
        );

        self.hyper = Some(hyper);
    }

    /// Merges proto-channels until the smallest no longer fits into any
    /// larger one without exceeding the size cap.
    ///
    /// Best-fit greedy: the list is sorted by member count once, then the
    /// smallest is repeatedly merged into the first channel, scanning from
    /// the largest downward, that has room for it. Shared members keep a
    /// single seat with their balances summed.
    fn unify_proto_channels(&self, proto_channels: &mut Vec<ProtoChannel>) {
        proto_channels.sort_by_key(|proto_channel| proto_channel.members.len());

        'merging: while !proto_channels.is_empty() {
            let smallest_size = proto_channels[0].members.len();

            for target in (0..proto_channels.len()).rev() {
                if target == 0 {
                    break 'merging; // The scan reached the smallest itself.
                }

                if smallest_size + proto_channels[target].members.len()
                    <= self.max_hyper_channel_size
                {
                    let smallest = proto_channels.remove(0);
                    let target = &mut proto_channels[target - 1];

                    for member in smallest.members {
                        if !target.members.contains(&member) {
                            target.members.push(member);
                        }
                        target.add_asset(member, smallest.assets[&member]);
                    }

                    // Re-sorting is not necessary for the scan to terminate.
                    continue 'merging;
                }
            }
        }
    }
}

fn div_ceil(dividend: usize, divisor: usize) -> usize {
    (dividend + divisor - 1) / divisor
}
