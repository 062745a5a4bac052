//! # Simulation Driver
//!
//! Steps a [`Building`] through a series of boundary conditions and keeps a record
//! of every step, so a run can be summarised afterwards.

use super::{Building, ConditioningMode, StepOutcome};
use chrono::Duration;
use tracing::{debug, info};

/// Inputs for one building step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryConditions {
    /// Outside air temperature (°C)
    pub outside_temperature: f64,
    /// Heating setpoint (°C)
    pub heating_setpoint: f64,
    /// Cooling setpoint (°C)
    pub cooling_setpoint: f64,
}

impl BoundaryConditions {
    pub fn new(outside_temperature: f64, heating_setpoint: f64, cooling_setpoint: f64) -> Self {
        Self {
            outside_temperature,
            heating_setpoint,
            cooling_setpoint,
        }
    }

    /// One set of conditions per outside temperature, all sharing the same setpoints
    pub fn constant_setpoints(
        outside_temperatures: &[f64],
        heating_setpoint: f64,
        cooling_setpoint: f64,
    ) -> Vec<Self> {
        outside_temperatures
            .iter()
            .map(|&outside| Self::new(outside, heating_setpoint, cooling_setpoint))
            .collect()
    }
}

/// One completed step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    /// Zero-based step index
    pub index: usize,
    pub boundary: BoundaryConditions,
    pub outcome: StepOutcome,
}

/// Aggregate figures over all recorded steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSummary {
    pub steps: usize,
    pub final_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Heating energy delivered (Wh, >= 0)
    pub heating_energy_wh: f64,
    /// Cooling energy delivered (Wh, <= 0)
    pub cooling_energy_wh: f64,
    pub heating_steps: usize,
    pub cooling_steps: usize,
    pub saturated_steps: usize,
}

/// Drives a single building and records its trajectory
#[derive(Debug, Clone)]
pub struct Simulation {
    building: Building,
    records: Vec<StepRecord>,
}

impl Simulation {
    pub fn new(building: Building) -> Self {
        Self {
            building,
            records: Vec::new(),
        }
    }

    pub fn building(&self) -> &Building {
        &self.building
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Consume the driver and hand back the building in its current state
    pub fn into_building(self) -> Building {
        self.building
    }

    /// Simulated time covered by the recorded steps, `None` if it overflows a `Duration`
    pub fn elapsed(&self) -> Option<Duration> {
        let steps = i32::try_from(self.records.len()).ok()?;
        self.building.time_step_size().checked_mul(steps)
    }

    /// Advance the building by one step
    pub fn step(&mut self, boundary: BoundaryConditions) -> StepRecord {
        let outcome = self.building.step(
            boundary.outside_temperature,
            boundary.heating_setpoint,
            boundary.cooling_setpoint,
        );
        let record = StepRecord {
            index: self.records.len(),
            boundary,
            outcome,
        };

        debug!(
            step = record.index,
            outside_temperature = boundary.outside_temperature,
            temperature = outcome.temperature,
            power = outcome.power,
            mode = %outcome.mode,
            saturated = outcome.saturated,
            "building step"
        );

        self.records.push(record);
        record
    }

    /// Step through every boundary condition in order
    ///
    /// Returns the records produced by this call.
    pub fn run<I>(&mut self, boundaries: I) -> &[StepRecord]
    where
        I: IntoIterator<Item = BoundaryConditions>,
    {
        let start = self.records.len();
        for boundary in boundaries {
            self.step(boundary);
        }

        info!(
            steps = self.records.len() - start,
            temperature = self.building.current_temperature(),
            "simulation run complete"
        );

        &self.records[start..]
    }

    /// Run `steps` steps, asking `conditions` for the inputs of each one
    ///
    /// The callback sees the step index and the building before that step is taken,
    /// which lets callers implement feedback schedules such as night setback.
    pub fn run_with<F>(&mut self, steps: usize, mut conditions: F) -> &[StepRecord]
    where
        F: FnMut(usize, &Building) -> BoundaryConditions,
    {
        let start = self.records.len();
        for index in start..start + steps {
            let boundary = conditions(index, &self.building);
            self.step(boundary);
        }

        info!(
            steps,
            temperature = self.building.current_temperature(),
            "simulation run complete"
        );

        &self.records[start..]
    }

    /// Summarise all recorded steps
    ///
    /// Energy uses the power applied in each step, so free-running steps contribute nothing.
    pub fn summary(&self) -> SimulationSummary {
        let step_hours = self.building.time_step_seconds() / 3600.0;
        let initial = SimulationSummary {
            steps: 0,
            final_temperature: self.building.current_temperature(),
            min_temperature: f64::INFINITY,
            max_temperature: f64::NEG_INFINITY,
            heating_energy_wh: 0.0,
            cooling_energy_wh: 0.0,
            heating_steps: 0,
            cooling_steps: 0,
            saturated_steps: 0,
        };

        let mut summary = self.records.iter().fold(initial, |mut acc, record| {
            let outcome = &record.outcome;
            acc.steps += 1;
            acc.min_temperature = acc.min_temperature.min(outcome.temperature);
            acc.max_temperature = acc.max_temperature.max(outcome.temperature);
            match outcome.mode {
                ConditioningMode::Heating => {
                    acc.heating_steps += 1;
                    acc.heating_energy_wh += outcome.power * step_hours;
                }
                ConditioningMode::Cooling => {
                    acc.cooling_steps += 1;
                    acc.cooling_energy_wh += outcome.power * step_hours;
                }
                ConditioningMode::Free => {}
            }
            if outcome.saturated {
                acc.saturated_steps += 1;
            }
            acc
        });

        if summary.steps == 0 {
            summary.min_temperature = summary.final_temperature;
            summary.max_temperature = summary.final_temperature;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn fully_damped() -> Simulation {
        let building = Building::new(3600.0, 0.0, -1.0, 1.0, 22.0, Duration::hours(1), 1.0).unwrap();
        Simulation::new(building)
    }

    #[fixture]
    fn house() -> Simulation {
        let building = Building::new(
            165_000.0 * 100.0,
            200.0,
            -25_000.0,
            25_000.0,
            20.0,
            Duration::hours(1),
            100.0,
        )
        .unwrap();
        Simulation::new(building)
    }

    #[test]
    fn test_constant_setpoints() {
        let boundaries = BoundaryConditions::constant_setpoints(&[1.0, 2.0, 3.0], 20.0, 26.0);
        assert_eq!(boundaries.len(), 3);
        assert_eq!(boundaries[2], BoundaryConditions::new(3.0, 20.0, 26.0));
    }

    #[rstest]
    fn test_run_records_every_step(mut fully_damped: Simulation) {
        let boundaries = BoundaryConditions::constant_setpoints(&[22.0; 4], 24.0, 26.0);
        let records = fully_damped.run(boundaries);

        let temperatures: Vec<f64> = records.iter().map(|r| r.outcome.temperature).collect();
        assert_eq!(temperatures, vec![23.0, 24.0, 24.0, 24.0]);
        assert_eq!(fully_damped.records().len(), 4);
        assert_eq!(fully_damped.records()[3].index, 3);
        assert_eq!(fully_damped.elapsed(), Some(Duration::hours(4)));
    }

    #[rstest]
    fn test_summary_energy(mut fully_damped: Simulation) {
        // Heat 1 Wh, heat 1 Wh, free-run, cool 1 Wh (saturated)
        fully_damped.step(BoundaryConditions::new(22.0, 24.0, 26.0));
        fully_damped.step(BoundaryConditions::new(22.0, 24.0, 26.0));
        fully_damped.step(BoundaryConditions::new(22.0, 20.0, 26.0));
        fully_damped.step(BoundaryConditions::new(22.0, 18.0, 20.0));

        let summary = fully_damped.summary();
        assert_eq!(summary.steps, 4);
        assert_eq!(summary.heating_steps, 2);
        assert_eq!(summary.cooling_steps, 1);
        assert_eq!(summary.saturated_steps, 2);
        assert_relative_eq!(summary.heating_energy_wh, 2.0);
        assert_relative_eq!(summary.cooling_energy_wh, -1.0);
        assert_eq!(summary.final_temperature, 23.0);
        assert_eq!(summary.min_temperature, 23.0);
        assert_eq!(summary.max_temperature, 24.0);
    }

    #[test]
    fn test_elapsed_overflow_is_none() {
        // Close to the largest step a Building accepts; ~1000 of them overflow a Duration
        let step = Duration::seconds(9_000_000_000_000);
        let building = Building::new(3600.0, 0.0, -1.0, 1.0, 22.0, step, 1.0).unwrap();
        let mut sim = Simulation::new(building);
        assert_eq!(sim.elapsed(), Some(Duration::zero()));

        sim.run_with(10, |_, _| BoundaryConditions::new(22.0, 20.0, 26.0));
        assert_eq!(sim.elapsed(), Some(step * 10));

        sim.run_with(1100, |_, _| BoundaryConditions::new(22.0, 20.0, 26.0));
        assert_eq!(sim.elapsed(), None);
    }

    #[rstest]
    fn test_summary_of_empty_run(fully_damped: Simulation) {
        let summary = fully_damped.summary();
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.min_temperature, 22.0);
        assert_eq!(summary.max_temperature, 22.0);
        assert_eq!(summary.heating_energy_wh, 0.0);
    }

    #[rstest]
    fn test_run_with_night_setback(mut house: Simulation) {
        let records = house.run_with(48, |index, _| {
            let heating_setpoint = if index % 24 < 6 { 16.0 } else { 20.0 };
            BoundaryConditions::new(0.0, heating_setpoint, 26.0)
        });
        assert_eq!(records.len(), 48);

        // Day hours are held at the heating setpoint
        for record in records.iter().filter(|r| r.index % 24 >= 6) {
            assert_relative_eq!(record.outcome.temperature, 20.0, max_relative = 1e-9);
        }
        // Setback lets the building drift below the day setpoint
        assert!(records[4].outcome.temperature < 20.0);
        assert!(records[4].outcome.temperature > 15.9);
        assert_eq!(records[0].outcome.mode, ConditioningMode::Free);
    }

    #[rstest]
    fn test_run_with_sees_building_before_step(mut fully_damped: Simulation) {
        let mut seen = Vec::new();
        fully_damped.run_with(3, |_, building| {
            seen.push(building.current_temperature());
            BoundaryConditions::new(22.0, 30.0, 40.0)
        });
        assert_eq!(seen, vec![22.0, 23.0, 24.0]);
        assert_eq!(fully_damped.into_building().current_temperature(), 25.0);
    }
}
