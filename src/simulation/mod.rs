//! # Building Simulation
//!
//! Single-zone lumped-capacitance building model and the driver that feeds it.
//!
//! ## Components
//!
//! - **Building**: Thermal capacitance and transmission with a power-limited ideal heating/cooling controller
//! - **Simulation**: Steps a building through boundary conditions and summarises the run
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Duration;
//! use simplesimple::simulation::{BoundaryConditions, Building, Simulation};
//!
//! let building = Building::new(
//!     165_000.0 * 100.0, // heat mass capacity (J/K)
//!     200.0,             // heat transmission (W/K)
//!     f64::NEG_INFINITY, // maximum cooling power (W)
//!     f64::INFINITY,     // maximum heating power (W)
//!     22.0,              // initial temperature (°C)
//!     Duration::hours(1),
//!     100.0,             // conditioned floor area (m²)
//! )?;
//!
//! let mut sim = Simulation::new(building);
//! sim.run(BoundaryConditions::constant_setpoints(&[-5.0, -3.0, 0.0], 20.0, 26.0));
//!
//! let summary = sim.summary();
//! assert_eq!(summary.steps, 3);
//! assert!(summary.heating_energy_wh > 0.0);
//! # Ok::<(), simplesimple::simulation::BuildingError>(())
//! ```

pub mod building;
pub mod driver;

pub use building::{Building, BuildingError, BuildingParams, ConditioningMode, StepOutcome};
pub use driver::{BoundaryConditions, Simulation, SimulationSummary, StepRecord};
