//! Configuration loader and validator for the experiment runner.
//! Handles parsing, validation, and access to the experiment configuration file.

use serde::Deserialize;
use std::fs;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// Main Configuration Structs
// ------------------------------------------------------------------------------------------------

/// Main configuration struct for the experiment runner.
///
/// Covers the network pair to generate and the payment workload to run
/// against it. Experiments that sweep a parameter start from these values.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Network pair generation parameters
    pub pair_config: PairConfig,
    /// Payment workload parameters
    pub workload_config: WorkloadConfig,
}

/// Configuration of the generated network pair.
#[derive(Debug, Deserialize, Clone)]
pub struct PairConfig {
    /// Seed for the deterministic pair generation
    pub seed: u64,
    /// Number of members per network
    pub num_members: usize,
    /// Number of channels in the classic network (defaults to 1.2 times the
    /// number of members when absent)
    #[serde(default)]
    pub num_classic_channels: Option<usize>,
    /// Lower bound of the log-uniform deposit distribution
    pub funding_contribution_min: i64,
    /// Upper bound of the log-uniform deposit distribution
    pub funding_contribution_max: i64,
    /// Hard cap on the number of members of a hyper channel
    pub max_hyper_channel_size: usize,
    /// Connectivity threshold below which classic channels are contracted
    pub hpc_avoidance_min_connectivity: usize,
    /// Whether to keep the number of hyper channels low by skipping path
    /// contraction
    #[serde(default)]
    pub hpc_parsimony: bool,
}

/// Configuration of the payment workload.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkloadConfig {
    /// Seed for the deterministic payment generation
    pub seed: u64,
    /// Number of payments to generate and execute
    pub num_payments: usize,
    /// Minimum size of a payment
    pub payment_size_min: i64,
    /// Maximum size of a payment
    pub payment_size_max: i64,
    /// Lower bound on the size of a monthly pay
    pub min_monthly_pay: i64,
    /// Initial wealth from which a member counts as a company
    pub company_wealth_min: i64,
    /// Probability that a generated payment is a monthly pay
    pub monthly_pay_probability: f64,
}

// ------------------------------------------------------------------------------------------------
// Error Types and Validation
// ------------------------------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

fn validate_fields(pair: &PairConfig, workload: &WorkloadConfig) -> Result<(), ConfigError> {
    if pair.num_members < 2 {
        return Err(ConfigError::ValidationError("Number of members must be at least 2".into()));
    }
    if let Some(channels) = pair.num_classic_channels {
        if channels + 1 < pair.num_members {
            return Err(ConfigError::ValidationError(
                "Number of classic channels must be at least the number of members minus 1".into(),
            ));
        }
    }
    if pair.funding_contribution_min <= 0
        || pair.funding_contribution_min > pair.funding_contribution_max
    {
        return Err(ConfigError::ValidationError("Funding contribution bounds are invalid".into()));
    }
    if pair.max_hyper_channel_size < 2 {
        return Err(ConfigError::ValidationError(
            "Maximum hyper channel size must be at least 2".into(),
        ));
    }
    if workload.num_payments == 0 {
        return Err(ConfigError::ValidationError("Number of payments must be positive".into()));
    }
    if workload.payment_size_min <= 0 || workload.payment_size_min > workload.payment_size_max {
        return Err(ConfigError::ValidationError("Payment size bounds are invalid".into()));
    }
    if workload.min_monthly_pay > workload.payment_size_max {
        return Err(ConfigError::ValidationError(
            "Minimum monthly pay must not exceed the maximum payment size".into(),
        ));
    }
    if !(0.0..=1.0).contains(&workload.monthly_pay_probability) {
        return Err(ConfigError::ValidationError(
            "Monthly pay probability must be between 0 and 1".into(),
        ));
    }
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// Configuration Implementation Methods
// ------------------------------------------------------------------------------------------------

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("simulator/config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_fields(&self.pair_config, &self.workload_config)
    }
}
