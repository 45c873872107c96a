//! Payment workload generation and execution.
//!
//! A [`Workload`] generates a seeded sequence of payments against a network
//! and executes them, recording the fees paid and the payments the network
//! could not route. Payment sizes are log-uniform; a small share are
//! "monthly pays", large payments originating from the wealthiest members.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::network::HyperNetwork;
use crate::types::MemberId;
use crate::utils::logging;

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Errors
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("payment size bounds are invalid: min {min}, max {max}")]
    InvalidPaymentBounds { min: i64, max: i64 },
    #[error("minimum monthly pay ({min_monthly_pay}) exceeds the maximum payment size ({payment_size_max})")]
    UnreachableMonthlyPay { min_monthly_pay: i64, payment_size_max: i64 },
    #[error("monthly pay probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
}

// ------------------------------------------------------------------------------------------------
// Builder
// ------------------------------------------------------------------------------------------------

/// Configures and produces a [`Workload`].
#[derive(Debug, Clone)]
pub struct WorkloadBuilder {
    seed: u64,
    payment_size_min: i64,
    payment_size_max: i64,
    min_monthly_pay: i64,
    company_wealth_min: i64,
    num_payments: usize,
    monthly_pay_probability: f64,
}

impl WorkloadBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            payment_size_min: 2_000_000,
            payment_size_max: 10_000_000_000,
            min_monthly_pay: 1_500_000_000,
            company_wealth_min: 20_000_000_000,
            num_payments: 1_000,
            monthly_pay_probability: 0.02,
        }
    }

    pub fn payment_size_min(mut self, payment_size_min: i64) -> Self {
        self.payment_size_min = payment_size_min;
        self
    }

    pub fn payment_size_max(mut self, payment_size_max: i64) -> Self {
        self.payment_size_max = payment_size_max;
        self
    }

    /// Lower bound on the size of a monthly pay.
    pub fn min_monthly_pay(mut self, min_monthly_pay: i64) -> Self {
        self.min_monthly_pay = min_monthly_pay;
        self
    }

    /// Initial wealth from which a member counts as a company.
    pub fn company_wealth_min(mut self, company_wealth_min: i64) -> Self {
        self.company_wealth_min = company_wealth_min;
        self
    }

    pub fn num_payments(mut self, num_payments: usize) -> Self {
        self.num_payments = num_payments;
        self
    }

    /// Probability that a generated payment is a monthly pay.
    pub fn monthly_pay_probability(mut self, monthly_pay_probability: f64) -> Self {
        self.monthly_pay_probability = monthly_pay_probability;
        self
    }

    pub fn generate(self) -> Result<Workload, ConfigError> {
        if self.payment_size_min <= 0 || self.payment_size_min > self.payment_size_max {
            return Err(ConfigError::InvalidPaymentBounds {
                min: self.payment_size_min,
                max: self.payment_size_max,
            });
        }
        if self.min_monthly_pay > self.payment_size_max {
            return Err(ConfigError::UnreachableMonthlyPay {
                min_monthly_pay: self.min_monthly_pay,
                payment_size_max: self.payment_size_max,
            });
        }
        if !(0.0..=1.0).contains(&self.monthly_pay_probability) {
            return Err(ConfigError::InvalidProbability(self.monthly_pay_probability));
        }

        Ok(Workload {
            seed: self.seed,
            rng: StdRng::seed_from_u64(self.seed),
            payment_size_max: self.payment_size_max,
            payment_exponent_range: (self.payment_size_min as f64 / self.payment_size_max as f64)
                .ln(),
            min_monthly_pay: self.min_monthly_pay,
            company_wealth_min: self.company_wealth_min,
            num_payments: self.num_payments,
            monthly_pay_probability: self.monthly_pay_probability,
            initialized: false,
            companies: Vec::new(),
            payments: Vec::new(),
            failed_payments: Vec::new(),
            paid_fees: Vec::new(),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// Workload
// ------------------------------------------------------------------------------------------------

/// A payment transferring `amount` from `origin` to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub origin: MemberId,
    pub destination: MemberId,
    pub amount: i64,
}

/// A seeded sequence of payments executed against one network.
///
/// For the same seed and the same wealth distribution, the payments
/// attempted and their order are the same.
pub struct Workload {
    seed: u64,
    rng: StdRng,
    payment_size_max: i64,
    payment_exponent_range: f64,
    min_monthly_pay: i64,
    company_wealth_min: i64,
    num_payments: usize,
    monthly_pay_probability: f64,
    initialized: bool,
    companies: Vec<MemberId>,
    payments: Vec<Payment>,
    failed_payments: Vec<Payment>,
    paid_fees: Vec<i64>,
}

impl Workload {
    /// Generates and executes the payments on `network`. May only be called
    /// once; a second call is a programmer error.
    pub fn init(&mut self, network: &mut HyperNetwork) {
        if self.initialized {
            panic!("a Workload may only be initialized once");
        }
        if self.num_payments > 0 && network.num_members() < 2 {
            panic!("a non-empty workload needs a network with at least two members");
        }

        self.determine_companies(network);
        self.determine_payments(network);
        self.perform_payments(network);

        self.initialized = true;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The payments that were generated, in execution order.
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// The fee paid for each successfully executed payment.
    pub fn paid_fees(&self) -> &[i64] {
        &self.paid_fees
    }

    /// The payments the network reported unroutable.
    pub fn failed_payments(&self) -> &[Payment] {
        &self.failed_payments
    }

    pub fn num_failed_payments(&self) -> usize {
        self.failed_payments.len()
    }

    /// Average size of the failed payments, or `None` if none failed.
    pub fn average_failed_payment_size(&self) -> Option<f64> {
        if self.failed_payments.is_empty() {
            return None;
        }

        let sum: i64 = self.failed_payments.iter().map(|payment| payment.amount).sum();
        Some(sum as f64 / self.failed_payments.len() as f64)
    }

    /// A payment amount drawn log-uniformly between the payment size bounds.
    fn sample_payment_amount(&mut self) -> i64 {
        let exponent = self.rng.gen::<f64>() * self.payment_exponent_range;
        (self.payment_size_max as f64 * exponent.exp()) as i64
    }

    /// Any member whose initial wealth is at least the company threshold is
    /// a company.
    fn determine_companies(&mut self, network: &HyperNetwork) {
        for &member in network.members() {
            if network.wealth_of(member) >= self.company_wealth_min {
                self.companies.push(member);
            }
        }

        logging::log("WORKLOAD", &format!("{} members qualify as companies", self.companies.len()));
    }

    /// Generates the payment sequence.
    ///
    /// Origins and destinations are uniform over the members (monthly pays
    /// originate from companies when there are any); amounts are
    /// log-uniform. A shadow ledger of generated-but-not-executed
    /// obligations gates acceptance: a candidate whose origin cannot afford
    /// it is discarded without advancing the count. Recipients immediately
    /// spend what they receive, so acceptance decrements origin and
    /// destination alike.
    fn determine_payments(&mut self, network: &HyperNetwork) {
        let members = network.members().to_vec();

        let mut fortunes: HashMap<MemberId, i64> =
            members.iter().map(|&member| (member, network.wealth_of(member))).collect();

        let mut accepted = 0;
        while accepted < self.num_payments {
            let is_monthly_pay = self.rng.gen::<f64>() <= self.monthly_pay_probability;

            let amount = if is_monthly_pay {
                loop {
                    let candidate = self.sample_payment_amount();
                    if candidate >= self.min_monthly_pay {
                        break candidate;
                    }
                }
            } else {
                self.sample_payment_amount()
            };

            let origin_candidates = if is_monthly_pay && !self.companies.is_empty() {
                &self.companies
            } else {
                &members
            };
            let origin = origin_candidates[self.rng.gen_range(0..origin_candidates.len())];

            let destination = loop {
                let candidate = members[self.rng.gen_range(0..members.len())];
                if candidate != origin {
                    break candidate;
                }
            };

            let origin_fortune = fortunes[&origin];
            if origin_fortune >= amount {
                *fortunes.get_mut(&origin).expect("origin is a member") -= amount;
                *fortunes.get_mut(&destination).expect("destination is a member") -= amount;

                self.payments.push(Payment { origin, destination, amount });
                accepted += 1;
            }
        }
    }

    /// Executes the generated payments in order.
    fn perform_payments(&mut self, network: &mut HyperNetwork) {
        for i in 0..self.payments.len() {
            let payment = self.payments[i];
            match network.perform_payment(payment.origin, payment.destination, payment.amount) {
                Some(fee) => self.paid_fees.push(fee),
                None => self.failed_payments.push(payment),
            }
        }

        logging::log(
            "WORKLOAD",
            &format!(
                "executed {} payments, {} failed",
                self.payments.len(),
                self.failed_payments.len()
            ),
        );
    }
}
