//! Experiment runners.
//!
//! Each experiment generates a network pair from the configured seed, runs
//! measurements or payment workloads against it, prints a summary, and saves
//! the outcome under `simulator/results/`.

use indicatif::{ProgressBar, ProgressStyle};

use hypernet::{NetworkPair, NetworkPairBuilder, Workload, WorkloadBuilder};

use crate::config::{Config, PairConfig, WorkloadConfig};
use crate::logging;
use crate::results;

// ------------------------------------------------------------------------------------------------
// Pair and Workload Construction
// ------------------------------------------------------------------------------------------------

/// Builds and initializes a pair from the configuration, optionally
/// overriding the maximum hyper channel size or the parsimony flag.
fn build_pair(
    config: &PairConfig,
    max_size_override: Option<usize>,
    parsimony_override: Option<bool>,
) -> Result<NetworkPair, String> {
    let mut builder = NetworkPairBuilder::new(config.seed)
        .num_members(config.num_members)
        .funding_contribution_min(config.funding_contribution_min)
        .funding_contribution_max(config.funding_contribution_max)
        .max_hyper_channel_size(max_size_override.unwrap_or(config.max_hyper_channel_size))
        .hpc_avoidance_min_connectivity(config.hpc_avoidance_min_connectivity)
        .hpc_parsimony(parsimony_override.unwrap_or(config.hpc_parsimony));
    if let Some(channels) = config.num_classic_channels {
        builder = builder.num_classic_channels(channels);
    }

    let mut pair = builder.generate().map_err(|e| e.to_string())?;
    pair.init();
    Ok(pair)
}

fn build_workload(config: &WorkloadConfig) -> Result<Workload, String> {
    WorkloadBuilder::new(config.seed)
        .num_payments(config.num_payments)
        .payment_size_min(config.payment_size_min)
        .payment_size_max(config.payment_size_max)
        .min_monthly_pay(config.min_monthly_pay)
        .company_wealth_min(config.company_wealth_min)
        .monthly_pay_probability(config.monthly_pay_probability)
        .generate()
        .map_err(|e| e.to_string())
}

fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

// ------------------------------------------------------------------------------------------------
// Experiments
// ------------------------------------------------------------------------------------------------

/// Prints and saves the measurement blocks of both networks.
pub fn run_stats_comparison(config: &Config) -> Result<(), String> {
    let pair = build_pair(&config.pair_config, None, None)?;

    let classic_stats = pair.classic_network().stats();
    let hyper_stats = pair.hyper_network().stats();

    println!("=== Classic network ===\n{}", classic_stats);
    println!("=== Hyper network ===\n{}", hyper_stats);

    results::save_text("stats_comparison", "classic_stats.txt", &classic_stats)?;
    results::save_text("stats_comparison", "hyper_stats.txt", &hyper_stats)?;
    results::save_json(
        "stats_comparison",
        "summary",
        &serde_json::json!({
            "generated_at": results::timestamp(),
            "seed": pair.seed(),
            "classic": {
                "channels": pair.classic_network().num_channels(),
                "memberships": pair.classic_network().num_channel_memberships(),
                "on_chain_bytes": pair.classic_network().total_on_chain_bytes(),
            },
            "hyper": {
                "channels": pair.hyper_network().num_channels(),
                "memberships": pair.hyper_network().num_channel_memberships(),
                "proper_hyper_channels": pair.hyper_network().num_proper_hyper_channels(),
                "on_chain_bytes": pair.hyper_network().total_on_chain_bytes(),
            },
        }),
    )
}

/// Runs the configured workload on both networks and compares the fees paid.
pub fn run_fees_paid(config: &Config) -> Result<(), String> {
    let mut pair = build_pair(&config.pair_config, None, None)?;

    let mut classic_workload = build_workload(&config.workload_config)?;
    classic_workload.init(pair.classic_network_mut());

    let mut hyper_workload = build_workload(&config.workload_config)?;
    hyper_workload.init(pair.hyper_network_mut());

    let classic_fees = classic_workload.paid_fees();
    let hyper_fees = hyper_workload.paid_fees();

    println!("Classic: average fee {:.2}, total {}", mean(classic_fees), classic_fees.iter().sum::<i64>());
    println!("Hyper:   average fee {:.2}, total {}", mean(hyper_fees), hyper_fees.iter().sum::<i64>());

    results::save_json(
        "fees_paid",
        "fees",
        &serde_json::json!({
            "generated_at": results::timestamp(),
            "workload_seed": classic_workload.seed(),
            "num_payments": config.workload_config.num_payments,
            "classic": {
                "average_fee": mean(classic_fees),
                "total_fees": classic_fees.iter().sum::<i64>(),
                "failed_payments": classic_workload.num_failed_payments(),
                "paid_fees": classic_fees,
            },
            "hyper": {
                "average_fee": mean(hyper_fees),
                "total_fees": hyper_fees.iter().sum::<i64>(),
                "failed_payments": hyper_workload.num_failed_payments(),
                "paid_fees": hyper_fees,
            },
        }),
    )
}

/// Runs the configured workload on both networks and dumps each member's fee
/// intake.
pub fn run_fee_intakes(config: &Config) -> Result<(), String> {
    let mut pair = build_pair(&config.pair_config, None, None)?;

    let mut classic_workload = build_workload(&config.workload_config)?;
    classic_workload.init(pair.classic_network_mut());

    let mut hyper_workload = build_workload(&config.workload_config)?;
    hyper_workload.init(pair.hyper_network_mut());

    let classic_intakes = pair.classic_network().fee_intakes();
    let hyper_intakes = pair.hyper_network().fee_intakes();

    results::save_json(
        "fee_intakes",
        "intakes",
        &serde_json::json!({
            "generated_at": results::timestamp(),
            "classic": classic_intakes.iter().map(|(member, intake)| {
                serde_json::json!({ "member": member, "intake": intake })
            }).collect::<Vec<_>>(),
            "hyper": hyper_intakes.iter().map(|(member, intake)| {
                serde_json::json!({ "member": member, "intake": intake })
            }).collect::<Vec<_>>(),
        }),
    )
}

/// Compares the default hyper network against its parsimonious variant.
pub fn run_parsimony_comparison(config: &Config) -> Result<(), String> {
    let mut pair = build_pair(&config.pair_config, None, Some(false))?;
    let mut parsimonious_pair = build_pair(&config.pair_config, None, Some(true))?;

    println!("=== Classic network ===\n{}", pair.classic_network().stats());
    println!("=== Hyper network ===\n{}", pair.hyper_network().stats());
    println!("=== Hyper network (parsimonious) ===\n{}", parsimonious_pair.hyper_network().stats());

    let mut classic_workload = build_workload(&config.workload_config)?;
    classic_workload.init(pair.classic_network_mut());
    let mut hyper_workload = build_workload(&config.workload_config)?;
    hyper_workload.init(pair.hyper_network_mut());
    let mut parsimonious_workload = build_workload(&config.workload_config)?;
    parsimonious_workload.init(parsimonious_pair.hyper_network_mut());

    let report = |name: &str, workload: &Workload| {
        println!(
            "{}: {} failed payments, average failed size {:?}",
            name,
            workload.num_failed_payments(),
            workload.average_failed_payment_size()
        );
    };
    report("classic", &classic_workload);
    report("hyper", &hyper_workload);
    report("hyper (parsimonious)", &parsimonious_workload);

    results::save_json(
        "parsimony_comparison",
        "failures",
        &serde_json::json!({
            "generated_at": results::timestamp(),
            "classic_failed": classic_workload.num_failed_payments(),
            "hyper_failed": hyper_workload.num_failed_payments(),
            "parsimonious_failed": parsimonious_workload.num_failed_payments(),
            "classic_average_failed_size": classic_workload.average_failed_payment_size(),
            "hyper_average_failed_size": hyper_workload.average_failed_payment_size(),
            "parsimonious_average_failed_size": parsimonious_workload.average_failed_payment_size(),
        }),
    )
}

/// Sweeps the maximum hyper channel size and records failure counts and fee
/// averages per size.
pub fn run_max_size_sweep(config: &Config) -> Result<(), String> {
    const SIZE_RANGE: std::ops::RangeInclusive<usize> = 3..=18;

    let progress_bar = ProgressBar::new(SIZE_RANGE.count() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} Size {pos}/{len} ({eta})")
            .map_err(|e| e.to_string())?
            .progress_chars("##-"),
    );

    let mut sweep_points = Vec::new();
    for max_size in SIZE_RANGE {
        let mut pair = build_pair(&config.pair_config, Some(max_size), None)?;

        let mut workload = build_workload(&config.workload_config)?;
        workload.init(pair.hyper_network_mut());

        sweep_points.push(serde_json::json!({
            "max_hyper_channel_size": max_size,
            "channels": pair.hyper_network().num_channels(),
            "failed_payments": workload.num_failed_payments(),
            "average_fee": mean(workload.paid_fees()),
            "total_fees": workload.paid_fees().iter().sum::<i64>(),
        }));

        progress_bar.inc(1);
    }
    progress_bar.finish();

    results::save_json(
        "max_size_sweep",
        "sweep",
        &serde_json::json!({
            "generated_at": results::timestamp(),
            "points": sweep_points,
        }),
    )
}

/// Exports both networks as GraphML, in hyperedge and clique form.
pub fn run_graph_export(config: &Config) -> Result<(), String> {
    let pair = build_pair(&config.pair_config, None, None)?;

    results::save_text("graph_export", "classic.graphml", &pair.classic_network().to_graphml())?;
    results::save_text(
        "graph_export",
        "classic_cliques.graphml",
        &pair.classic_network().to_graphml_cliques(),
    )?;
    results::save_text("graph_export", "hyper.graphml", &pair.hyper_network().to_graphml())?;
    results::save_text(
        "graph_export",
        "hyper_cliques.graphml",
        &pair.hyper_network().to_graphml_cliques(),
    )?;

    logging::log("SIMULATOR", "exported both networks as GraphML");
    Ok(())
}
