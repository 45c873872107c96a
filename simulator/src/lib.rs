pub mod config;
pub mod experiments;
pub mod interface;
pub mod logging;
pub mod results;

pub use config::Config;
pub use interface::SimulatorInterface;
