pub mod config;
pub mod simulation;
pub mod telemetry;

pub use simulation::{Building, BuildingError, StepOutcome};
