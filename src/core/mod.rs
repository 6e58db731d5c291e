pub mod config;
pub mod error;
pub mod thresholds;
pub mod types;

pub use config::SimulationConfig;
pub use thresholds::ThresholdTable;
pub use types::{EntityId, Seconds, Tick};
