use crate::simulation::{BoundaryConditions, Building, BuildingError};
use anyhow::Result;
use chrono::Duration;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::Path;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub building: BuildingConfig,
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Building parameters in SI units
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingConfig {
    /// J/K
    pub heat_mass_capacity: f64,
    /// W/K
    pub heat_transmission: f64,
    /// W, absent means unbounded
    #[serde(default)]
    pub maximum_cooling_power: Option<f64>,
    /// W, absent means unbounded
    #[serde(default)]
    pub maximum_heating_power: Option<f64>,
    pub initial_temperature: f64,
    pub time_step_seconds: i64,
    /// m²
    pub conditioned_floor_area: f64,
}

impl BuildingConfig {
    pub fn time_step(&self) -> Result<Duration, BuildingError> {
        Duration::try_seconds(self.time_step_seconds).ok_or_else(|| {
            BuildingError::invalid(
                "time_step_size",
                self.time_step_seconds as f64,
                "out of range",
            )
        })
    }

    /// Names of the power limits left unset, which build as unbounded
    pub fn unbounded_limits(&self) -> Vec<&'static str> {
        let mut unbounded = Vec::new();
        if self.maximum_heating_power.is_none() {
            unbounded.push("maximum_heating_power");
        }
        if self.maximum_cooling_power.is_none() {
            unbounded.push("maximum_cooling_power");
        }
        unbounded
    }

    pub fn build(&self) -> Result<Building, BuildingError> {
        Building::new(
            self.heat_mass_capacity,
            self.heat_transmission,
            self.maximum_cooling_power.unwrap_or(f64::NEG_INFINITY),
            self.maximum_heating_power.unwrap_or(f64::INFINITY),
            self.initial_temperature,
            self.time_step()?,
            self.conditioned_floor_area,
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_setpoints"))]
pub struct ScenarioConfig {
    pub heating_setpoint: f64,
    pub cooling_setpoint: f64,
    #[validate(range(min = 1))]
    pub steps: usize,
    /// Repeated cyclically until `steps` is reached
    #[validate(length(min = 1))]
    pub outside_temperatures: Vec<f64>,
}

fn validate_setpoints(scenario: &ScenarioConfig) -> Result<(), ValidationError> {
    if scenario.heating_setpoint > scenario.cooling_setpoint {
        return Err(ValidationError::new("heating_setpoint_above_cooling_setpoint"));
    }
    Ok(())
}

impl ScenarioConfig {
    pub fn boundaries(&self) -> impl Iterator<Item = BoundaryConditions> + '_ {
        self.outside_temperatures
            .iter()
            .cycle()
            .take(self.steps)
            .map(|&outside| {
                BoundaryConditions::new(outside, self.heating_setpoint, self.cooling_setpoint)
            })
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config/default.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SIMPLESIMPLE__").split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.scenario.validate()?;
        Ok(config)
    }
}
