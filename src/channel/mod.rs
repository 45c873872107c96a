//! Multi-party payment channels.
//!
//! A [`HyperChannel`] holds a collective pool of funds split into per-member
//! balances. Payments crossing the channel pay a fee that is decomposed into
//! per-member balance changes; the channel refuses any payment that would
//! leave a member with a negative balance.

use crate::types::constants::{
    AVAILABILITY_PER_MEMBER, DEVIATION_PENALTY, INV_INTEREST_PER_TX_TIME_UNIT, PER_TX_PER_MEMBER,
    SENDER_BONUS,
};
use crate::types::MemberId;
use crate::utils::stats;

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Data Structures
// ------------------------------------------------------------------------------------------------

/// A payment channel shared by two or more members.
///
/// The member list and the funding amount are fixed at construction; only the
/// balance split between members changes, and only through settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperChannel {
    /// Members in insertion order.
    members: Vec<MemberId>,
    /// Balance of each member, parallel to `members`.
    balances: Vec<i64>,
    /// Sum of the initial deposits; invariant: equals the balance sum.
    funding_amount: i64,
}

// ------------------------------------------------------------------------------------------------
// Construction and Accessors
// ------------------------------------------------------------------------------------------------

impl HyperChannel {
    /// Creates a channel from members and their matching deposits.
    ///
    /// Panics if fewer than two members are given, if a member repeats, if
    /// the deposit vector does not match the member vector in length, or if
    /// a deposit is negative. These are programmer errors, not runtime
    /// conditions.
    pub(crate) fn new(members: Vec<MemberId>, deposits: Vec<i64>) -> Self {
        if members.len() != deposits.len() {
            panic!(
                "channel members and deposits must be equal in size, but got {} members and {} deposits",
                members.len(),
                deposits.len()
            );
        }
        if members.len() < 2 {
            panic!("a channel needs at least two members, got {}", members.len());
        }
        for (i, member) in members.iter().enumerate() {
            if members[..i].contains(member) {
                panic!("channel member {} appears more than once", member);
            }
        }
        if let Some(deposit) = deposits.iter().find(|&&deposit| deposit < 0) {
            panic!("channel deposits must not be negative, got {}", deposit);
        }

        let funding_amount = deposits.iter().sum();
        Self { members, balances: deposits, funding_amount }
    }

    /// Returns the balance of `member` in this channel.
    ///
    /// Panics if `member` is not a member of this channel.
    pub fn balance_of(&self, member: MemberId) -> i64 {
        self.balances[self.position(member)]
    }

    /// Returns a snapshot of the balances in member insertion order.
    pub fn balances(&self) -> Vec<(MemberId, i64)> {
        self.members.iter().copied().zip(self.balances.iter().copied()).collect()
    }

    /// Members of this channel in insertion order.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn funding_amount(&self) -> i64 {
        self.funding_amount
    }

    pub fn num_members(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, member: MemberId) -> bool {
        self.members.contains(&member)
    }

    /// Minimum on-chain storage in bytes to fund this channel's wallet and
    /// pay its funds back out to the members.
    pub fn min_on_chain_bytes(&self) -> usize {
        const FIXED_SIZE: usize = 10;
        const INPUT_SIZE: usize = 180;
        const SIGNATURE_SIZE: usize = 73;
        const RECEIVING_ADDRESS_SIZE: usize = 34;

        FIXED_SIZE + INPUT_SIZE + self.members.len() * (SIGNATURE_SIZE + RECEIVING_ADDRESS_SIZE)
    }

    /// How much the members value this channel not being locked, per time
    /// unit a transaction takes per hop.
    pub fn time_value_of_funds(&self) -> i64 {
        self.funding_amount / INV_INTEREST_PER_TX_TIME_UNIT
            + self.members.len() as i64 * AVAILABILITY_PER_MEMBER
    }

    fn position(&self, member: MemberId) -> usize {
        self.members
            .iter()
            .position(|&m| m == member)
            .unwrap_or_else(|| panic!("{} is not a member of this channel", member))
    }
}

// ------------------------------------------------------------------------------------------------
// Fee Model
// ------------------------------------------------------------------------------------------------

impl HyperChannel {
    /// Compensation for the change in balance imbalance a payment causes.
    ///
    /// Measured as the change in the standard deviation of the balance
    /// vector were the raw transfer applied without fees, weighted by
    /// [`DEVIATION_PENALTY`]. Negative when the payment balances the channel.
    fn imbalance_compensation(&self, origin: usize, destination: usize, amount: i64) -> i64 {
        let deviation_before = stats::std_deviation(&self.balances);

        let mut balances_after = self.balances.clone();
        balances_after[origin] -= amount;
        balances_after[destination] += amount;
        let deviation_after = stats::std_deviation(&balances_after);

        ((deviation_after - deviation_before) * DEVIATION_PENALTY).round() as i64
    }

    /// Per-member balance changes due to fees, in member order.
    ///
    /// The origin's row is corrected by the full provisional sum (its own
    /// row included), so the returned vector always sums to zero. The
    /// imbalance term uses truncated integer division by the member count;
    /// the remainder is not redistributed.
    fn fee_changes(&self, origin: usize, destination: usize, amount: i64, hop_index: usize) -> Vec<i64> {
        let imbalance = self.imbalance_compensation(origin, destination, amount);
        let num_members = self.members.len() as i64;
        let hop_factor = 1 + 2 * hop_index as i64;

        let mut changes: Vec<i64> = self
            .balances
            .iter()
            .map(|balance| {
                PER_TX_PER_MEMBER
                    + hop_factor * (balance / INV_INTEREST_PER_TX_TIME_UNIT + AVAILABILITY_PER_MEMBER)
                    + imbalance / num_members
            })
            .collect();

        let sum: i64 = changes.iter().sum();
        changes[origin] -= sum;

        changes
    }

    /// Balance vector and fee changes after the described payment, or `None`
    /// if applying them would leave a member with a negative balance.
    fn settlement(
        &self,
        origin: usize,
        destination: usize,
        amount: i64,
        hop_index: usize,
    ) -> Option<(Vec<i64>, Vec<i64>)> {
        let fee_changes = self.fee_changes(origin, destination, amount, hop_index);
        debug_assert_eq!(fee_changes.iter().sum::<i64>(), 0);

        let mut new_balances: Vec<i64> =
            self.balances.iter().zip(&fee_changes).map(|(balance, change)| balance + change).collect();
        new_balances[origin] -= amount;
        new_balances[destination] += amount;

        if new_balances.iter().any(|&balance| balance < 0) {
            return None;
        }

        Some((new_balances, fee_changes))
    }

    /// Returns the fee the origin pays to transact `amount` to `destination`
    /// over this channel, or `None` if no fee makes the payment possible.
    ///
    /// `hop_index` is 0 if the payee is in this channel and grows by one per
    /// channel further along the payment path; the fee rises with it because
    /// the path stays locked for longer.
    pub fn fee_for(
        &self,
        origin: MemberId,
        destination: MemberId,
        amount: i64,
        hop_index: usize,
    ) -> Option<i64> {
        let origin = self.position(origin);
        let destination = self.position(destination);
        debug_assert!(origin != destination);
        debug_assert!(amount >= 0);

        self.settlement(origin, destination, amount, hop_index)?;

        let quote = -self.fee_changes(origin, destination, amount, hop_index)[origin] + SENDER_BONUS;
        Some(quote.max(0))
    }

    /// Applies fee changes and the transfer for a payment of `amount` from
    /// `origin` to `destination`, returning the fee changes in member order.
    ///
    /// On `None` the channel is unchanged. The owning network credits the
    /// returned changes (plus the sender bonus) to its fee ledger.
    pub(crate) fn settle(
        &mut self,
        origin: MemberId,
        destination: MemberId,
        amount: i64,
        hop_index: usize,
    ) -> Option<Vec<i64>> {
        let origin = self.position(origin);
        let destination = self.position(destination);
        debug_assert!(origin != destination);
        debug_assert!(amount >= 0);

        let (new_balances, fee_changes) = self.settlement(origin, destination, amount, hop_index)?;
        self.balances = new_balances;
        debug_assert_eq!(self.balances.iter().sum::<i64>(), self.funding_amount);

        Some(fee_changes)
    }
}
