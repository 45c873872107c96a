use std::io::{self, Write};

use crate::config::Config;
use crate::experiments;

pub enum Experiment {
    StatsComparison,
    FeesPaid,
    FeeIntakes,
    ParsimonyComparison,
    MaxSizeSweep,
    GraphExport,
    Exit,
}

impl Experiment {
    pub fn from_input(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Experiment::StatsComparison),
            "2" => Some(Experiment::FeesPaid),
            "3" => Some(Experiment::FeeIntakes),
            "4" => Some(Experiment::ParsimonyComparison),
            "5" => Some(Experiment::MaxSizeSweep),
            "6" => Some(Experiment::GraphExport),
            "0" => Some(Experiment::Exit),
            _ => None,
        }
    }
}

pub struct SimulatorInterface;

impl SimulatorInterface {
    pub fn new() -> Self {
        Self
    }

    pub fn get_menu_text(&self) -> &'static str {
        "Available experiments:\n  1. Network stats comparison\n  2. Fees paid comparison\n  3. Fee intakes per member\n  4. Parsimony comparison\n  5. Sweep maximum hyper channel size\n  6. GraphML export\n  0. Exit"
    }

    pub fn show_menu(&self) {
        println!("=== Hypernet Simulator ===");
        println!("{}", self.get_menu_text());
    }

    pub fn get_user_choice(&self) -> Option<Experiment> {
        print!("\nSelect experiment (1-6): ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).expect("Failed to read input");

        Experiment::from_input(&input)
    }

    /// Runs the chosen experiment; returns whether the loop should continue.
    pub fn run(&self, experiment: &Experiment, config: &Config) -> Result<bool, String> {
        match experiment {
            Experiment::StatsComparison => experiments::run_stats_comparison(config)?,
            Experiment::FeesPaid => experiments::run_fees_paid(config)?,
            Experiment::FeeIntakes => experiments::run_fee_intakes(config)?,
            Experiment::ParsimonyComparison => experiments::run_parsimony_comparison(config)?,
            Experiment::MaxSizeSweep => experiments::run_max_size_sweep(config)?,
            Experiment::GraphExport => experiments::run_graph_export(config)?,
            Experiment::Exit => return Ok(false),
        }
        Ok(true)
    }
}

impl Default for SimulatorInterface {
    fn default() -> Self {
        Self::new()
    }
}
