//! Networks of multi-party payment channels.
//!
//! A [`HyperNetwork`] owns its channels and tracks, per member, the incident
//! channels and the cumulative fee intake. Payments are routed along the
//! cheapest feasible path and settled channel by channel from the payee side
//! towards the sender.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::fmt;

use crate::channel::HyperChannel;
use crate::types::constants::SENDER_BONUS;
use crate::types::{ChannelId, MemberId, PaymentRoute};
use crate::utils::logging;

mod export;

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Data Structures
// ------------------------------------------------------------------------------------------------

/// A network of members connected by [`HyperChannel`]s.
///
/// Members, channels, incident-channel lists, and the fee ledger all iterate
/// in insertion order; this is what makes seeded runs reproducible.
#[derive(Debug, Default)]
pub struct HyperNetwork {
    /// Members in insertion order.
    members: Vec<MemberId>,
    /// Member id to index into the parallel vectors.
    member_index: HashMap<MemberId, usize>,
    /// Channels in insertion order; a [`ChannelId`] is an index in here.
    channels: Vec<HyperChannel>,
    /// Incident channels per member, parallel to `members`.
    incident: Vec<Vec<ChannelId>>,
    /// Cumulative fee intake per member, parallel to `members`. Signed:
    /// imbalance compensation can reduce a member's intake.
    fee_intakes: Vec<i64>,
}

// ------------------------------------------------------------------------------------------------
// Registration and Accessors
// ------------------------------------------------------------------------------------------------

impl HyperNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `member` with this network. Adding a member twice is a
    /// no-op.
    pub fn add_member(&mut self, member: MemberId) {
        if self.member_index.contains_key(&member) {
            return;
        }

        self.member_index.insert(member, self.members.len());
        self.members.push(member);
        self.incident.push(Vec::new());
        self.fee_intakes.push(0);
    }

    /// Opens a channel between `members` with the given `deposits` and
    /// returns its id. Channel ids are assigned in call order.
    ///
    /// Panics if a member is not registered with this network, or on the
    /// construction errors checked by [`HyperChannel`] (fewer than two
    /// members, duplicate members, negative or mismatched deposits).
    pub fn add_channel(&mut self, members: &[MemberId], deposits: &[i64]) -> ChannelId {
        for member in members {
            if !self.member_index.contains_key(member) {
                panic!("channel member {} is not registered with this network", member);
            }
        }

        let id = ChannelId(self.channels.len());
        self.channels.push(HyperChannel::new(members.to_vec(), deposits.to_vec()));
        for member in members {
            self.incident[self.member_index[member]].push(id);
        }

        id
    }

    /// Members of this network in insertion order.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn num_members(&self) -> usize {
        self.members.len()
    }

    /// Returns the channel with id `channel`.
    pub fn channel(&self, channel: ChannelId) -> &HyperChannel {
        &self.channels[channel.0]
    }

    /// Channels of this network in insertion order.
    pub fn channels(&self) -> impl Iterator<Item = (ChannelId, &HyperChannel)> {
        self.channels.iter().enumerate().map(|(i, channel)| (ChannelId(i), channel))
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Channels `member` belongs to, in the order it joined them.
    ///
    /// Panics if `member` is not registered with this network.
    pub fn incident_channels(&self, member: MemberId) -> &[ChannelId] {
        &self.incident[self.index_of(member)]
    }

    /// How much each member made (or lost) in fees, in member insertion
    /// order.
    pub fn fee_intakes(&self) -> Vec<(MemberId, i64)> {
        self.members.iter().copied().zip(self.fee_intakes.iter().copied()).collect()
    }

    /// Total balance of `member` across all channels it belongs to.
    pub fn wealth_of(&self, member: MemberId) -> i64 {
        self.incident[self.index_of(member)]
            .iter()
            .map(|&channel| self.channels[channel.0].balance_of(member))
            .sum()
    }

    /// Maximum amount `member` can receive, summed over its channels.
    pub fn max_receipt_of(&self, member: MemberId) -> i64 {
        self.incident[self.index_of(member)]
            .iter()
            .map(|&channel| {
                let channel = &self.channels[channel.0];
                channel.funding_amount() - channel.balance_of(member)
            })
            .sum()
    }

    fn index_of(&self, member: MemberId) -> usize {
        *self
            .member_index
            .get(&member)
            .unwrap_or_else(|| panic!("{} is not registered with this network", member))
    }

    fn credit_fee(&mut self, member: MemberId, amount: i64) {
        let index = self.index_of(member);
        self.fee_intakes[index] += amount;
    }
}

// ------------------------------------------------------------------------------------------------
// Route Search
// ------------------------------------------------------------------------------------------------

impl HyperNetwork {
    /// Returns the cheapest route for a payment of `amount` from `origin` to
    /// `destination`, or `None` if the payment is unroutable.
    ///
    /// The search is a Dijkstra run backwards from the payee. A channel
    /// closer to the sender has to transact the amount plus all downstream
    /// fees and keep the path locked for longer, so each edge is quoted with
    /// the accumulated amount and the count of channels already on the path
    /// below it. Edges whose quote is rejected are skipped. Ties are broken
    /// by the order in which members first attained their distance, and
    /// among equal-cost edges by channel-list insertion order.
    pub fn cheapest_route(
        &self,
        origin: MemberId,
        destination: MemberId,
        amount: i64,
    ) -> Option<PaymentRoute> {
        const INFINITY: i64 = i64::MAX;

        let origin_index = self.index_of(origin);
        let destination_index = self.index_of(destination);

        let mut distances = vec![INFINITY; self.members.len()];
        let mut previous: Vec<Option<usize>> = vec![None; self.members.len()];
        // Channels on the best path from each member down to the payee,
        // nearest channel first.
        let mut channel_stacks: Vec<Vec<ChannelId>> = vec![Vec::new(); self.members.len()];

        distances[destination_index] = 0;
        previous[destination_index] = Some(destination_index);

        let mut sequence = 0u64;
        let mut queue = BinaryHeap::new();
        queue.push(Reverse((0i64, sequence, destination_index)));

        while let Some(Reverse((distance, _, settled))) = queue.pop() {
            if distance > distances[settled] {
                continue; // Stale queue entry; the member was reached cheaper.
            }

            for &channel_id in &self.incident[settled] {
                if channel_stacks[settled].contains(&channel_id) {
                    continue; // Going through the same channel twice never pays.
                }

                let channel = &self.channels[channel_id.0];
                let hop_index = channel_stacks[settled].len();

                for &neighbor in channel.members() {
                    let neighbor_index = self.member_index[&neighbor];
                    if neighbor_index == settled {
                        continue;
                    }

                    let additional_fee = match channel.fee_for(
                        neighbor,
                        self.members[settled],
                        amount + distance,
                        hop_index,
                    ) {
                        Some(fee) => fee,
                        None => continue, // Channel cannot carry this payment.
                    };

                    let alternative = distance + additional_fee;
                    if alternative < distances[neighbor_index] {
                        distances[neighbor_index] = alternative;
                        previous[neighbor_index] = Some(settled);

                        let mut stack = Vec::with_capacity(channel_stacks[settled].len() + 1);
                        stack.push(channel_id);
                        stack.extend_from_slice(&channel_stacks[settled]);
                        channel_stacks[neighbor_index] = stack;

                        sequence += 1;
                        queue.push(Reverse((alternative, sequence, neighbor_index)));
                    }
                }
            }
        }

        if distances[origin_index] == INFINITY {
            return None;
        }

        let mut hops = vec![origin];
        let mut current = origin_index;
        while previous[current] != Some(current) {
            current = previous[current].expect("reached member must have a predecessor");
            hops.push(self.members[current]);
        }

        Some(PaymentRoute { hops, channels: channel_stacks[origin_index].clone() })
    }
}

// ------------------------------------------------------------------------------------------------
// Payment Execution
// ------------------------------------------------------------------------------------------------

impl HyperNetwork {
    /// Attempts a payment of `amount` from `origin` to `destination` along
    /// the cheapest route. Returns the total fee the sender paid, or `None`
    /// if the payment is unroutable; in that case the network is unchanged.
    pub fn perform_payment(
        &mut self,
        origin: MemberId,
        destination: MemberId,
        amount: i64,
    ) -> Option<i64> {
        let route = self.cheapest_route(origin, destination, amount)?;

        // Quote every hop before settling anything. A quote depends only on
        // the quoted channel's own balances and a channel appears at most
        // once per route, so quoting up front and settling afterwards sees
        // the same state.
        let mut fees = vec![0i64; route.len()];
        let mut accumulated = amount;
        for i in (0..route.len()).rev() {
            let fee = self.channels[route.channels[i].0].fee_for(
                route.hops[i],
                route.hops[i + 1],
                accumulated,
                i,
            )?;
            fees[i] = fee;
            accumulated += fee;
        }

        let total_fees: i64 = fees.iter().sum();

        // Settle from the hop nearest the payee towards the sender. Each
        // channel transacts the amount arriving at the payee plus the fees
        // of all channels below it, minus its own fee.
        let mut to_transact = amount + total_fees;
        for i in (0..route.len()).rev() {
            to_transact -= fees[i];
            let settled = self.perform_channel_payment(
                route.channels[i],
                route.hops[i],
                route.hops[i + 1],
                to_transact,
                i,
            );
            debug_assert!(settled, "route search admitted a channel the settlement rejected");
            if !settled {
                logging::log(
                    "NETWORK",
                    &format!(
                        "settlement rejected on channel {} of route {} -> {}",
                        route.channels[i], origin, destination
                    ),
                );
            }
        }

        Some(total_fees)
    }

    /// Performs a payment of `amount` from `origin` to `destination` across
    /// the single channel `channel` at the given hop index, crediting the
    /// members' fee changes and the sender bonus to the fee ledger.
    ///
    /// Returns whether settlement happened; on `false` the network is
    /// unchanged.
    pub fn perform_channel_payment(
        &mut self,
        channel: ChannelId,
        origin: MemberId,
        destination: MemberId,
        amount: i64,
        hop_index: usize,
    ) -> bool {
        let fee_changes = match self.channels[channel.0].settle(origin, destination, amount, hop_index)
        {
            Some(changes) => changes,
            None => return false,
        };

        let members: Vec<MemberId> = self.channels[channel.0].members().to_vec();
        for (member, change) in members.into_iter().zip(fee_changes) {
            self.credit_fee(member, change);
        }
        self.credit_fee(origin, SENDER_BONUS);

        true
    }
}

// ------------------------------------------------------------------------------------------------
// Measurements
// ------------------------------------------------------------------------------------------------

impl HyperNetwork {
    /// Sum of the membership counts of all channels.
    pub fn num_channel_memberships(&self) -> usize {
        self.channels.iter().map(|channel| channel.num_members()).sum()
    }

    /// Number of channels with exactly two members.
    pub fn num_classic_channels(&self) -> usize {
        self.channels.iter().filter(|channel| channel.num_members() == 2).count()
    }

    /// Number of channels with more than two members.
    pub fn num_proper_hyper_channels(&self) -> usize {
        self.channels.iter().filter(|channel| channel.num_members() > 2).count()
    }

    /// Total minimum on-chain storage across all channels, in bytes.
    pub fn total_on_chain_bytes(&self) -> usize {
        self.channels.iter().map(|channel| channel.min_on_chain_bytes()).sum()
    }

    /// Diameter of the network, measured in unweighted hops on the clique
    /// expansion of the hypergraph. Infinite if the network is disconnected.
    pub fn diameter(&self) -> f64 {
        let count = self.members.len();
        if count == 0 {
            return 0.0;
        }

        let mut diameter = 0usize;
        for source in 0..count {
            let mut distances = vec![usize::MAX; count];
            distances[source] = 0;
            let mut queue = VecDeque::from([source]);

            while let Some(current) = queue.pop_front() {
                for &channel in &self.incident[current] {
                    for &neighbor in self.channels[channel.0].members() {
                        let neighbor = self.member_index[&neighbor];
                        if distances[neighbor] == usize::MAX {
                            distances[neighbor] = distances[current] + 1;
                            queue.push_back(neighbor);
                        }
                    }
                }
            }

            let eccentricity = *distances.iter().max().expect("network has members");
            if eccentricity == usize::MAX {
                return f64::INFINITY;
            }
            diameter = diameter.max(eccentricity);
        }

        diameter as f64
    }

    /// Returns a human-readable block of measurements of this network. The
    /// exact wording and layout are not part of the API.
    pub fn stats(&self) -> String {
        let num_channels = self.num_channels();
        let num_members = self.num_members();
        let memberships = self.num_channel_memberships();

        let mut block = String::new();
        block.push_str(&format!("Number of channels:\t\t\t\t{}\n", num_channels));
        block.push_str(&format!("Number of channel memberships:\t\t\t{}\n", memberships));
        block.push_str(&format!("Diameter:\t\t\t\t\t{}\n", self.diameter()));
        if num_members > 0 {
            block.push_str(&format!(
                "Number of channels per member:\t\t\t{}\n",
                num_channels as f64 / num_members as f64
            ));
            block.push_str(&format!(
                "Avg. number of channel memberships per member:\t{}\n",
                memberships as f64 / num_members as f64
            ));
        }
        block.push_str(&format!(
            "Total amount of on-chain storage space req.:\t{} kB\n",
            self.total_on_chain_bytes() as f64 / 1000.0
        ));

        if num_members > 0 {
            let wealths: Vec<i64> = self.members.iter().map(|&member| self.wealth_of(member)).collect();
            let receipts: Vec<i64> =
                self.members.iter().map(|&member| self.max_receipt_of(member)).collect();

            block.push_str(&format!(
                "Average fortune:\t\t\t\t{}\n",
                wealths.iter().sum::<i64>() as f64 / num_members as f64
            ));
            block.push_str(&format!(
                "Minimum fortune:\t\t\t\t{}\n",
                wealths.iter().min().expect("network has members")
            ));
            block.push_str(&format!(
                "Average max. receipt:\t\t\t\t{}\n",
                receipts.iter().sum::<i64>() as f64 / num_members as f64
            ));
            block.push_str(&format!(
                "Minimum max. receipt:\t\t\t\t{}\n",
                receipts.iter().min().expect("network has members")
            ));
        }
        if num_channels > 0 {
            block.push_str(&format!(
                "Proper hyper-channel proportion:\t\t{}\n",
                self.num_proper_hyper_channels() as f64 / num_channels as f64
            ));
        }

        block
    }
}

impl fmt::Display for HyperNetwork {
    /// One line per channel, listing its members by 1-based index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, channel) in self.channels.iter().enumerate() {
            write!(f, "C{}:\t", i + 1)?;
            for (j, member) in channel.members().iter().enumerate() {
                if j > 0 {
                    write!(f, ",\t")?;
                }
                write!(f, "M{}", self.member_index[member] + 1)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
