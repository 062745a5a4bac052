//! # Single-Zone Building Model
//!
//! Lumped-capacitance thermal model of a building: the whole thermal mass is one
//! node with capacitance `C` [J/K] coupled to the outside through a heat loss
//! coefficient `H` [W/K]:
//!
//! ```text
//! C * dT/dt = H * (T_outside - T) + P
//! ```
//!
//! Each [`Building::step`] advances the node by one fixed time step with an explicit
//! forward-Euler update. Heating/cooling power `P` is chosen by an ideal controller
//! that hits the active setpoint exactly, limited by the actuator's maximum power.

use chrono::Duration;
use thiserror::Error;
use tracing::{trace, warn};

/// Reference probe load per conditioned floor area (W/m²) used to linearise the step response
const PROBE_POWER_W_PER_M2: f64 = 10.0;

/// Building construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildingError {
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl BuildingError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        BuildingError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// What the controller did during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConditioningMode {
    /// Free-running temperature stayed inside the deadband
    Free,
    Heating,
    Cooling,
}

/// Result of a single [`Building::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Indoor temperature at the end of the step (°C)
    pub temperature: f64,
    /// Heating (> 0) or cooling (< 0) power applied during this step (W)
    pub power: f64,
    pub mode: ConditioningMode,
    /// Unrestricted power exceeded the actuator limit and was clamped
    pub saturated: bool,
}

/// Constructor arguments for [`Building`], bundled
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingParams {
    /// Thermal capacitance of the building mass (J/K)
    pub heat_mass_capacity: f64,
    /// Heat loss coefficient to the outside (W/K)
    pub heat_transmission: f64,
    /// Maximum cooling power (W, <= 0)
    pub maximum_cooling_power: f64,
    /// Maximum heating power (W, >= 0)
    pub maximum_heating_power: f64,
    pub initial_building_temperature: f64,
    pub time_step_size: Duration,
    /// Conditioned floor area (m²)
    pub conditioned_floor_area: f64,
}

/// Single-zone building with frozen thermal parameters and mutable temperature state.
///
/// Parameters can only be read after construction. `current_temperature` and
/// `thermal_power` change together, and only inside [`Building::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    heat_mass_capacity: f64,
    heat_transmission: f64,
    maximum_cooling_power: f64,
    maximum_heating_power: f64,
    time_step_size: Duration,
    time_step_seconds: f64,
    conditioned_floor_area: f64,

    current_temperature: f64,
    thermal_power: f64,
}

impl Building {
    /// Create a new building
    ///
    /// # Errors
    /// [`BuildingError::InvalidParameter`] when `maximum_heating_power` is negative,
    /// `maximum_cooling_power` is positive, or when `heat_mass_capacity`,
    /// `time_step_size` or `conditioned_floor_area` are not strictly positive.
    pub fn new(
        heat_mass_capacity: f64,
        heat_transmission: f64,
        maximum_cooling_power: f64,
        maximum_heating_power: f64,
        initial_building_temperature: f64,
        time_step_size: Duration,
        conditioned_floor_area: f64,
    ) -> Result<Self, BuildingError> {
        if maximum_heating_power.is_nan() || maximum_heating_power < 0.0 {
            return Err(BuildingError::invalid(
                "maximum_heating_power",
                maximum_heating_power,
                "must not be negative",
            ));
        }
        if maximum_cooling_power.is_nan() || maximum_cooling_power > 0.0 {
            return Err(BuildingError::invalid(
                "maximum_cooling_power",
                maximum_cooling_power,
                "must not be positive",
            ));
        }
        if !(heat_mass_capacity.is_finite() && heat_mass_capacity > 0.0) {
            return Err(BuildingError::invalid(
                "heat_mass_capacity",
                heat_mass_capacity,
                "must be finite and positive",
            ));
        }
        let time_step_seconds = match time_step_size.num_microseconds() {
            Some(micros) => micros as f64 / 1e6,
            None => {
                return Err(BuildingError::invalid(
                    "time_step_size",
                    time_step_size.num_seconds() as f64,
                    "out of range",
                ))
            }
        };
        if time_step_seconds <= 0.0 {
            return Err(BuildingError::invalid(
                "time_step_size",
                time_step_seconds,
                "must be at least one microsecond",
            ));
        }
        // A zero area makes the probe response flat and the power solve divides by zero
        if !(conditioned_floor_area.is_finite() && conditioned_floor_area > 0.0) {
            return Err(BuildingError::invalid(
                "conditioned_floor_area",
                conditioned_floor_area,
                "must be finite and positive",
            ));
        }

        Ok(Self {
            heat_mass_capacity,
            heat_transmission,
            maximum_cooling_power,
            maximum_heating_power,
            time_step_size,
            time_step_seconds,
            conditioned_floor_area,
            current_temperature: initial_building_temperature,
            thermal_power: 0.0,
        })
    }

    pub fn from_params(params: BuildingParams) -> Result<Self, BuildingError> {
        Self::new(
            params.heat_mass_capacity,
            params.heat_transmission,
            params.maximum_cooling_power,
            params.maximum_heating_power,
            params.initial_building_temperature,
            params.time_step_size,
            params.conditioned_floor_area,
        )
    }

    pub fn heat_mass_capacity(&self) -> f64 {
        self.heat_mass_capacity
    }

    pub fn heat_transmission(&self) -> f64 {
        self.heat_transmission
    }

    pub fn maximum_cooling_power(&self) -> f64 {
        self.maximum_cooling_power
    }

    pub fn maximum_heating_power(&self) -> f64 {
        self.maximum_heating_power
    }

    pub fn time_step_size(&self) -> Duration {
        self.time_step_size
    }

    /// Time step length in seconds, microsecond resolution
    pub fn time_step_seconds(&self) -> f64 {
        self.time_step_seconds
    }

    pub fn conditioned_floor_area(&self) -> f64 {
        self.conditioned_floor_area
    }

    /// Indoor temperature (°C)
    pub fn current_temperature(&self) -> f64 {
        self.current_temperature
    }

    /// Heating/cooling power set by the last conditioning step (W)
    ///
    /// Steps that stay inside the deadband leave this value untouched, so it can
    /// be non-zero while the building is free-running. Use [`StepOutcome::power`]
    /// for the power applied in a given step.
    pub fn thermal_power(&self) -> f64 {
        self.thermal_power
    }

    /// Advance the building by one time step
    ///
    /// # Arguments
    /// * `outside_temperature` - Outside air temperature (°C)
    /// * `heating_setpoint` - Heating is applied when the free-running temperature falls below this (°C)
    /// * `cooling_setpoint` - Cooling is applied when the free-running temperature rises above this (°C)
    pub fn step(
        &mut self,
        outside_temperature: f64,
        heating_setpoint: f64,
        cooling_setpoint: f64,
    ) -> StepOutcome {
        let free_running = self.next_temperature(outside_temperature, 0.0);

        if free_running >= heating_setpoint && free_running <= cooling_setpoint {
            self.current_temperature = free_running;
            return StepOutcome {
                temperature: free_running,
                power: 0.0,
                mode: ConditioningMode::Free,
                saturated: false,
            };
        }

        let (mode, setpoint, max_power) = if free_running < heating_setpoint {
            (ConditioningMode::Heating, heating_setpoint, self.maximum_heating_power)
        } else {
            (ConditioningMode::Cooling, cooling_setpoint, self.maximum_cooling_power)
        };

        // next_temperature is affine in power, so one probe fixes the slope
        let probe_power = PROBE_POWER_W_PER_M2 * self.conditioned_floor_area;
        let probe_temperature = self.next_temperature(outside_temperature, probe_power);
        let unrestricted_power =
            probe_power * (setpoint - free_running) / (probe_temperature - free_running);

        // Probe response below float resolution: power cannot move the temperature
        if !unrestricted_power.is_finite() {
            warn!(
                %mode,
                free_running,
                probe_temperature,
                "flat probe response, leaving building free-running"
            );
            self.thermal_power = 0.0;
            self.current_temperature = free_running;
            return StepOutcome {
                temperature: free_running,
                power: 0.0,
                mode,
                saturated: false,
            };
        }

        let saturated = unrestricted_power.abs() > max_power.abs();
        let power = if saturated { max_power } else { unrestricted_power };
        if saturated {
            trace!(
                %mode,
                unrestricted_power,
                max_power,
                "conditioning power saturated"
            );
        }

        let temperature = self.next_temperature(outside_temperature, power);
        self.thermal_power = power;
        self.current_temperature = temperature;

        StepOutcome {
            temperature,
            power,
            mode,
            saturated,
        }
    }

    /// Forward-Euler temperature after one step with the given heating/cooling power
    fn next_temperature(&self, outside_temperature: f64, power: f64) -> f64 {
        let dt_by_cm = self.time_step_seconds() / self.heat_mass_capacity;
        self.current_temperature * (1.0 - dt_by_cm * self.heat_transmission)
            + dt_by_cm * (power + self.heat_transmission * outside_temperature)
    }
}
