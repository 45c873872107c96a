use std::process;

use simulator::{Config, SimulatorInterface};

fn main() {
    hypernet::utils::logging::init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        process::exit(1);
    });

    let interface = SimulatorInterface::new();

    loop {
        interface.show_menu();

        let experiment = match interface.get_user_choice() {
            Some(experiment) => experiment,
            None => {
                println!("Unknown selection, try again.");
                continue;
            }
        };

        match interface.run(&experiment, &config) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                eprintln!("Experiment failed: {}", e);
                process::exit(1);
            }
        }
    }
}
